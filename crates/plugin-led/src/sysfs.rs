//! Access to the kernel LED class directory.
//!
//! Each LED is a directory holding at least a `brightness` and a `trigger`
//! file. Switching an LED sets its trigger to `none` first so the kernel
//! stops driving it, then writes the brightness.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

use podview_core::error::AppError;
use podview_core::result::AppResult;

use crate::model::LedInfo;

/// Where the kernel exposes LEDs.
pub const DEFAULT_LEDS_PATH: &str = "/sys/class/leds";

const BRIGHTNESS: &str = "brightness";
const TRIGGER: &str = "trigger";

/// Lists controllable LEDs under `root`, sorted by name.
///
/// Entries without both control files, or whose brightness cannot be read,
/// are skipped. A missing `root` is a `NotFound` error.
pub async fn discover(root: &Path) -> AppResult<Vec<LedInfo>> {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::not_found(format!(
                "LEDs directory {} does not exist",
                root.display()
            )));
        }
        Err(e) => {
            return Err(AppError::external(
                format!("Failed to read LEDs directory {}", root.display()),
                e,
            ));
        }
    };

    let mut leds = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        // `metadata` follows symlinks, which is how sysfs exposes LEDs.
        if let Err(e) = fs::metadata(path.join(TRIGGER)).await {
            debug!(led = %name, error = %e, "Skipping LED without trigger file");
            continue;
        }
        let Some(brightness) = read_brightness(&path).await else {
            debug!(led = %name, "Skipping LED with unreadable brightness");
            continue;
        };

        leds.push(LedInfo {
            name,
            path,
            brightness,
        });
    }

    leds.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(leds)
}

/// Reads the brightness of the LED at `led_dir`. Unparseable content reads
/// as `0`.
pub async fn read_brightness(led_dir: &Path) -> Option<u32> {
    let raw = fs::read_to_string(led_dir.join(BRIGHTNESS)).await.ok()?;
    Some(raw.trim().parse().unwrap_or(0))
}

/// Re-reads the brightness of every LED in place. LEDs that cannot be read
/// keep their previous value.
pub async fn refresh(leds: &mut [LedInfo]) {
    for led in leds.iter_mut() {
        if let Some(brightness) = read_brightness(&led.path).await {
            led.brightness = brightness;
        }
    }
}

async fn switch(led: &LedInfo, on: bool) -> io::Result<()> {
    fs::write(led.path.join(TRIGGER), "none").await?;
    fs::write(led.path.join(BRIGHTNESS), if on { "1" } else { "0" }).await
}

/// Switches every LED on or off, returning how many were switched.
///
/// Fails only when at least one LED could not be written and none
/// succeeded.
pub async fn set_all(leds: &[LedInfo], on: bool) -> AppResult<usize> {
    let mut switched = 0;
    let mut last_error = None;

    for led in leds {
        match switch(led, on).await {
            Ok(()) => switched += 1,
            Err(e) => {
                debug!(led = %led.name, error = %e, "Failed to switch LED");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if switched == 0 => {
            Err(AppError::external(format!("Failed to set LEDs: {e}"), e))
        }
        _ => Ok(switched),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    /// Creates `<root>/<name>/{brightness,trigger}`.
    pub fn make_led(root: &Path, name: &str, brightness: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("brightness"), brightness).unwrap();
        std::fs::write(dir.join("trigger"), "[none] timer heartbeat").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::testing::make_led;
    use super::*;
    use podview_core::error::ErrorKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discover_skips_incomplete_entries() {
        let dir = TempDir::new().unwrap();
        make_led(dir.path(), "led1", "0\n");
        make_led(dir.path(), "led0", "1\n");
        std::fs::create_dir(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken").join("brightness"), "1").unwrap();

        let leds = discover(dir.path()).await.unwrap();
        let names: Vec<&str> = leds.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["led0", "led1"]);
        assert_eq!(leds[0].brightness, 1);
        assert_eq!(leds[1].brightness, 0);
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_set_all_writes_trigger_then_brightness() {
        let dir = TempDir::new().unwrap();
        make_led(dir.path(), "led0", "1");
        make_led(dir.path(), "led1", "1");
        let mut leds = discover(dir.path()).await.unwrap();

        assert_eq!(set_all(&leds, false).await.unwrap(), 2);
        refresh(&mut leds).await;
        assert!(leds.iter().all(|l| l.brightness == 0));

        let trigger = std::fs::read_to_string(dir.path().join("led0").join("trigger")).unwrap();
        assert_eq!(trigger, "none");
    }

    #[tokio::test]
    async fn test_set_all_fails_when_nothing_switched() {
        let dir = TempDir::new().unwrap();
        make_led(dir.path(), "led0", "1");
        let leds = discover(dir.path()).await.unwrap();
        std::fs::remove_dir_all(dir.path().join("led0")).unwrap();

        let err = set_all(&leds, true).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert_eq!(set_all(&[], true).await.unwrap(), 0);
    }
}
