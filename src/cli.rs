use crate::device_registry::DeviceOptions;
use crate::discovery::ScanOptions;
use crate::protocol::Calibration;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Wii controllers as virtual gamepads and keyboard/mouse
#[derive(Parser, Debug)]
#[command(name = "wii-bridge")]
#[command(version)]
#[command(about = "Bridges Wii Remotes and their extensions to uinput devices", long_about = None)]
pub struct Cli {
    /// Run the commands in FILE before reading stdin
    #[arg(short, long, value_name = "FILE")]
    pub load_file: Option<PathBuf>,

    /// Change to DIR before loading any file
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Number of virtual gamepads
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub num_pads: u8,

    /// Ignore controllers that are already connected
    #[arg(long)]
    pub no_enumerate: bool,

    /// Do not watch for new controllers
    #[arg(long)]
    pub no_monitor: bool,

    /// Leave Wii U Pro controllers alone
    #[arg(long)]
    pub ignore_pro: bool,

    /// Do not show the slot number on controller LEDs
    #[arg(long)]
    pub no_set_leds: bool,

    /// Do not put the LEDs back when a controller is released
    #[arg(long)]
    pub no_restore_leds: bool,

    /// Hotplug poll period
    #[arg(long, default_value_t = 500, value_name = "MS")]
    pub scan_interval_ms: u64,

    /// More output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// IR pointer center, horizontal
    #[arg(long, value_name = "X")]
    pub ir_center_x: Option<f32>,

    /// IR pointer center, vertical
    #[arg(long, value_name = "Y")]
    pub ir_center_y: Option<f32>,

    /// Balance board dead zone, in raw sensor units
    #[arg(long, value_name = "UNITS")]
    pub balance_deadzone: Option<i32>,

    /// Balance board share of the total weight that maps to a full deflection
    #[arg(long, value_name = "RATIO")]
    pub balance_weight: Option<f32>,

    /// Pro controller stick multiplier
    #[arg(long, value_name = "SCALE")]
    pub pro_stick_scale: Option<i32>,
}

impl Cli {
    pub fn calibration(&self) -> Calibration {
        let defaults = Calibration::default();
        Calibration {
            ir_center_x: self.ir_center_x.unwrap_or(defaults.ir_center_x),
            ir_center_y: self.ir_center_y.unwrap_or(defaults.ir_center_y),
            balance_deadzone: self.balance_deadzone.unwrap_or(defaults.balance_deadzone),
            balance_weight: self.balance_weight.unwrap_or(defaults.balance_weight),
            pro_stick_scale: self.pro_stick_scale.unwrap_or(defaults.pro_stick_scale),
        }
    }

    pub fn device_options(&self) -> DeviceOptions {
        DeviceOptions {
            set_leds: !self.no_set_leds,
            restore_leds: !self.no_restore_leds,
            ignore_pro: self.ignore_pro,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            enumerate: !self.no_enumerate,
            monitor: !self.no_monitor,
            interval: Duration::from_millis(self.scan_interval_ms.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["wii-bridge"]);
        assert_eq!(cli.num_pads, 4);
        assert_eq!(cli.calibration(), Calibration::default());
        let options = cli.device_options();
        assert!(options.set_leds && options.restore_leds && !options.ignore_pro);
        let scan = cli.scan_options();
        assert!(scan.enumerate && scan.monitor);
        assert_eq!(scan.interval, Duration::from_millis(500));
    }

    #[test]
    fn flags_and_overrides() {
        let cli = Cli::parse_from([
            "wii-bridge",
            "-n",
            "2",
            "-vv",
            "--no-set-leds",
            "--ignore-pro",
            "--no-monitor",
            "--pro-stick-scale",
            "40",
            "-l",
            "couch.cmds",
        ]);
        assert_eq!(cli.num_pads, 2);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.device_options().set_leds);
        assert!(cli.device_options().ignore_pro);
        assert!(!cli.scan_options().monitor);
        assert_eq!(cli.calibration().pro_stick_scale, 40);
        assert_eq!(cli.load_file, Some(PathBuf::from("couch.cmds")));
    }

    #[test]
    fn pad_count_is_bounded() {
        assert!(Cli::try_parse_from(["wii-bridge", "-n", "10"]).is_err());
    }
}
