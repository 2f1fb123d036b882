//! LED control plugin for PodView.
//!
//! Discovers LEDs exposed by the kernel under `/sys/class/leds` (or the
//! directory named by the `LEDS_PATH` setting), reports their aggregate
//! status and switches them all on or off.

pub mod model;
pub mod plugin;
pub mod sysfs;

pub use plugin::LedPlugin;
