pub mod behavior;
pub mod food;
pub mod motion;
pub mod population;
