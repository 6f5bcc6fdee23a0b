//! Line-oriented control surface for stdin and command files.

use crate::bridge::{Bridge, Feature};
use crate::error::{BridgeError, Result};
use crate::input_mode::{ModeSelector, SlotType};
use crate::logger::log_block;
use crate::mapping::store::GAMEPAD;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Tokens past this count are discarded.
pub const MAX_WORDS: usize = 6;
/// Lines one interactive command may run, nested loads included.
pub const MAX_LOAD_LINES: usize = 500;

pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().take(MAX_WORDS).collect()
}

pub struct Shell {
    load_lines: usize,
    stop: CancellationToken,
}

impl Shell {
    pub fn new(stop: CancellationToken) -> Self {
        Self {
            load_lines: 0,
            stop,
        }
    }

    /// One line typed by the user.
    pub fn interactive(&mut self, bridge: &mut Bridge, line: &str) {
        self.load_lines = 0;
        self.execute(bridge, line);
    }

    /// Runs a command file. Stops early on shutdown or when the line
    /// budget is spent.
    pub fn load_file(&mut self, bridge: &mut Bridge, path: &Path) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                println!("Failed to open file '{}': {}", path.display(), e);
                return;
            }
        };
        println!("Reading commands from file '{}'", path.display());
        for line in BufReader::new(file).lines() {
            if self.stop.is_cancelled() || self.load_lines > MAX_LOAD_LINES {
                break;
            }
            match line {
                Ok(line) => self.execute(bridge, &line),
                Err(e) => {
                    debug!("{}: {}", path.display(), e);
                    break;
                }
            }
        }
    }

    fn execute(&mut self, bridge: &mut Bridge, line: &str) {
        if self.load_lines == MAX_LOAD_LINES {
            println!("Maximum number of lines for command files exceeded.");
            println!("Either files are loading each other in a loop, or they are too big.");
            self.load_lines += 1;
            return;
        }
        self.load_lines += 1;

        let words = tokenize(line);
        let Some((&command, args)) = words.split_first() else {
            return;
        };
        if command.starts_with('#') {
            return;
        }

        let result = match command {
            "quit" => {
                self.stop.cancel();
                Ok(())
            }
            "help" => {
                print_help();
                Ok(())
            }
            "modes" => {
                print_modes();
                Ok(())
            }
            "events" => {
                print_events();
                Ok(())
            }
            "features" => {
                print_features();
                Ok(())
            }
            "map" => map(bridge, args),
            "enable" => toggle(bridge, args, true),
            "disable" => toggle(bridge, args, false),
            "load" => match args.first() {
                Some(file) => {
                    self.load_file(bridge, Path::new(file));
                    Ok(())
                }
                None => Err(BridgeError::Usage("load <filename>")),
            },
            "slot" => slot(bridge, args),
            "assign" => match args {
                [device, slot, ..] => bridge.assign(device, slot),
                _ => Err(BridgeError::Usage(
                    "assign <device name|address> <slot number|keyboardmouse|none>",
                )),
            },
            "list" => {
                list_devices(bridge, None);
                Ok(())
            }
            "maps" => {
                list_mappings(bridge);
                Ok(())
            }
            "newmap" => match args {
                [name, ..] => bridge.create_mapping(name).map(|_| ()),
                _ => Err(BridgeError::Usage("newmap <name>")),
            },
            "deletemap" => match args {
                [name, ..] => bridge.delete_mapping(name),
                _ => Err(BridgeError::Usage("deletemap <name>")),
            },
            "copymap" => match args {
                [dest, src, ..] => bridge.copy_mapping(dest, src),
                _ => Err(BridgeError::Usage("copymap <destination> <source>")),
            },
            "setmap" => match args {
                [target, name, ..] => bridge.set_mapping(target, name),
                _ => Err(BridgeError::Usage("setmap <device|slot> <mapping|none>")),
            },
            "rename" => match args {
                [device, name, ..] => bridge.rename_device(device, name),
                _ => Err(BridgeError::Usage("rename <device name|address> <new name>")),
            },
            _ => {
                println!("Command not recognized.");
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{}", e);
        }
    }
}

/// Leading mapping name is optional; a mode keyword first means `gamepad`.
fn split_mapping<'a>(args: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    match args.split_first() {
        Some((first, rest)) if ModeSelector::from_name(first).is_none() => (*first, rest),
        _ => (GAMEPAD, args),
    }
}

fn parse_mode(name: &str) -> Result<ModeSelector> {
    ModeSelector::from_name(name)
        .ok_or_else(|| BridgeError::InvalidReference(name.to_string(), "controller mode"))
}

fn map(bridge: &mut Bridge, args: &[&str]) -> Result<()> {
    const USAGE: &str = "map [mapping] <mode> <wii input> <output> [invert]";
    let (mapping, rest) = split_mapping(args);
    let [mode, input, output, option @ ..] = rest else {
        return Err(BridgeError::Usage(USAGE));
    };
    let invert = option.first() == Some(&"invert");
    bridge.map_input(mapping, parse_mode(mode)?, input, output, invert)
}

fn toggle(bridge: &mut Bridge, args: &[&str], on: bool) -> Result<()> {
    const USAGE: &str = "<enable|disable> [mapping] <mode> <accel|ir> [multiple]";
    let (mapping, rest) = split_mapping(args);
    let [mode, feature, option @ ..] = rest else {
        return Err(BridgeError::Usage(USAGE));
    };
    let feature = Feature::from_name(feature)
        .ok_or_else(|| BridgeError::InvalidReference(feature.to_string(), "feature"))?;
    let multiple = option.first() == Some(&"multiple");
    bridge.toggle_feature(mapping, parse_mode(mode)?, feature, on, multiple)
}

fn slot(bridge: &mut Bridge, args: &[&str]) -> Result<()> {
    let [name, setting, ..] = args else {
        return Err(BridgeError::Usage("slot <slot number> <gamepad|keyboardmouse|list>"));
    };
    if *setting == "list" {
        let number = bridge
            .slots()
            .lookup(name)
            .ok_or_else(|| BridgeError::InvalidReference(name.to_string(), "slot"))?;
        list_devices(bridge, Some(number));
        return Ok(());
    }
    let slot_type = SlotType::from_name(setting)
        .ok_or_else(|| BridgeError::InvalidReference(setting.to_string(), "slot type"))?;
    bridge.set_slot_type(name, slot_type)
}

fn list_devices(bridge: &Bridge, slot: Option<usize>) {
    let mut lines = Vec::new();
    for device in bridge.devices().iter() {
        if slot.is_some() && device.slot() != slot {
            continue;
        }
        lines.push(format!("- {} ({})", device.name(), device.address()));
        if !device.is_open() {
            lines.push("    not connected".to_string());
            continue;
        }
        lines.push(format!("    {}", device.category()));
        lines.push(match device.slot() {
            Some(0) => "    assigned to the virtual keyboard/mouse".to_string(),
            Some(n) => format!("    assigned to slot {}", n),
            None => "    not assigned to any slot".to_string(),
        });
    }
    if lines.is_empty() {
        lines.push("no devices".to_string());
    }
    let title = match slot {
        Some(n) => format!("Slot {}", n),
        None => "Devices".to_string(),
    };
    log_block(&title, lines);
}

fn list_mappings(bridge: &Bridge) {
    let lines = bridge
        .mappings()
        .listed()
        .into_iter()
        .map(|(name, refs)| format!("{} (refs={})", name, refs))
        .collect();
    log_block("Mappings", lines);
}

fn print_help() {
    println!("Commands:");
    println!("\thelp - this message");
    println!("\tmap - change a button or axis mapping in one of the modes");
    println!("\tenable/disable - turn accelerometer or IR processing on or off");
    println!("\tlist - list known devices");
    println!("\tassign - move a device to a virtual slot");
    println!("\tslot - make a slot a gamepad or a keyboard/mouse, or list its devices");
    println!("\tnewmap/deletemap/copymap/maps - manage named mappings");
    println!("\tsetmap - give a device or slot its own mapping");
    println!("\trename - rename a device");
    println!("\tload - run the commands in a file");
    println!("\tquit - shut down");
    println!("\tmodes, events, features - list recognized keywords");
    println!("Commands that take arguments print their usage when called without them.");
}

fn print_modes() {
    println!("Each mapping keeps one table per mode; the mode follows the attached extension.");
    println!("\twiimote - no extension (Motion Plus is ignored)");
    println!("\tnunchuk - a nunchuk is attached");
    println!("\tclassic - a classic controller is attached, or a Wii U Pro Controller");
    println!("\tall - every mode at once");
}

fn print_events() {
    println!("Input buttons:");
    println!("\tup down left right a b c x y z plus minus home 1 2 l r zl zr thumbl thumbr");
    println!("Input axes:");
    println!("\taccel_x accel_y accel_z - remote tilt");
    println!("\tn_accel_x n_accel_y n_accel_z - nunchuk tilt");
    println!("\tir_x ir_y - IR pointer");
    println!("\tn_x n_y - nunchuk stick");
    println!("\tleft_x left_y right_x right_y - classic/pro sticks");
    println!("\tbal_x bal_y - balance board center of gravity");
    println!("Gamepad output buttons:");
    println!("\tup down left right north south east west start select mode");
    println!("\ttl tr tl2 tr2 thumbl thumbr none");
    println!("Keyboard/mouse output buttons:");
    println!("\tleft_click right_click middle_click key_a key_leftshift ...");
    println!("Output axes:");
    println!("\tleft_x left_y right_x right_y none (mouse_x mouse_y alias the left stick)");
    println!("Append \"invert\" to an axis mapping to invert it.");
}

fn print_features() {
    println!("Features:");
    println!("\taccel - read the accelerometers and output their axis mappings");
    println!("\tir - read the IR pointer (\"multiple\" is accepted and treated the same)");
}
