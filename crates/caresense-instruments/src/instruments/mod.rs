pub mod clock_drawing;
pub mod digit_span;
pub mod meem;
pub mod stroop;
pub mod tmt;
