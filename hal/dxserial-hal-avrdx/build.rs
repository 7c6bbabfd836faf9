//! Build script for dxserial-hal-avrdx
//!
//! - Picks the package variant from the enabled `da*` feature
//! - Validates variants/<variant>.toml
//! - Generates pin location and USART pin-group tables into OUT_DIR

use std::collections::BTreeSet;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const VARIANTS: [&str; 4] = ["da28", "da32", "da48", "da64"];

/// Routing register names, in register order
const ROUTE_REGISTERS: [&str; 2] = ["A", "B"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let variant = selected_variant();
    let path = PathBuf::from("variants").join(format!("{}.toml", variant));
    println!("cargo:rerun-if-changed={}", path.display());

    let config = load_variant(&path);
    let layout = parse_layout(&config, &path);

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("pin_tables.rs"), generate(variant, &layout)).unwrap();
}

/// Package pin location: port index (A = 0) and bit
#[derive(Clone, Copy, PartialEq, Eq)]
struct Location {
    port: u8,
    bit: u8,
}

struct Group {
    mux: u8,
    tx: Option<u8>,
    xck: Option<u8>,
}

struct UsartDef {
    index: u8,
    register: u8,
    mask: u8,
    none_code: u8,
    groups: Vec<Group>,
}

struct Layout {
    name: String,
    pins: Vec<Option<Location>>,
    usarts: Vec<UsartDef>,
}

/// Exactly one `da*` feature must be enabled
fn selected_variant() -> &'static str {
    let enabled: Vec<&'static str> = VARIANTS
        .iter()
        .copied()
        .filter(|v| env::var(format!("CARGO_FEATURE_{}", v.to_uppercase())).is_ok())
        .collect();

    match enabled.as_slice() {
        [one] => *one,
        [] => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: No package variant selected                              ║\n\
            ║                                                                  ║\n\
            ║  Enable exactly one of the features da28, da32, da48, da64.      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        ),
        many => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: More than one package variant selected                   ║\n\
            ║                                                                  ║\n\
            ║  Enabled: {:<54} ║\n\
            ║  Use default-features = false when picking a variant.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            many.join(", ")
        ),
    }
}

fn load_variant(path: &Path) -> toml::Value {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read variant file                              ║\n\
                ║                                                                  ║\n\
                ║  File:  {:<56} ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                path.display(),
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in variant file                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// "PA0".."PG7"
fn parse_pin_name(name: &str) -> Option<Location> {
    match name.as_bytes() {
        [b'P', port @ b'A'..=b'G', bit @ b'0'..=b'7'] => Some(Location {
            port: port - b'A',
            bit: bit - b'0',
        }),
        _ => None,
    }
}

fn parse_layout(config: &toml::Value, path: &Path) -> Layout {
    let mut errors = Vec::new();

    let name = match config.get("name").and_then(|n| n.as_str()) {
        Some(name) => name.to_string(),
        None => {
            errors.push("missing 'name'".to_string());
            String::new()
        }
    };

    let pins = parse_pins(config, &mut errors);
    let usarts = parse_usarts(config, &pins, &mut errors);

    if !errors.is_empty() {
        report(&format!("Invalid variant {}", path.display()), &errors);
    }

    Layout { name, pins, usarts }
}

fn parse_pins(config: &toml::Value, errors: &mut Vec<String>) -> Vec<Option<Location>> {
    let list = match config.get("pins").and_then(|p| p.as_array()) {
        Some(list) => list,
        None => {
            errors.push("missing 'pins' array".to_string());
            return Vec::new();
        }
    };

    if list.len() > 255 {
        errors.push(format!("{} pins listed, at most 255 fit a pin number", list.len()));
    }

    let mut seen = BTreeSet::new();
    let mut pins = Vec::with_capacity(list.len());
    for (number, entry) in list.iter().enumerate() {
        match entry.as_str() {
            Some("-") => pins.push(None),
            Some(name) => match parse_pin_name(name) {
                Some(loc) => {
                    if !seen.insert((loc.port, loc.bit)) {
                        errors.push(format!("pin {} listed twice", name));
                    }
                    pins.push(Some(loc));
                }
                None => {
                    errors.push(format!("pins[{}]: '{}' is not a port pin name", number, name));
                    pins.push(None);
                }
            },
            None => {
                errors.push(format!("pins[{}] must be a string", number));
                pins.push(None);
            }
        }
    }
    pins
}

fn parse_usarts(
    config: &toml::Value,
    pins: &[Option<Location>],
    errors: &mut Vec<String>,
) -> Vec<UsartDef> {
    let table = match config.get("usart").and_then(|u| u.as_table()) {
        Some(t) => t,
        None => {
            errors.push("missing [usart.N] sections".to_string());
            return Vec::new();
        }
    };

    let number_of = |name: &str| -> Option<u8> {
        let loc = parse_pin_name(name)?;
        pins.iter()
            .position(|p| *p == Some(loc))
            .and_then(|n| u8::try_from(n).ok())
    };

    let mut usarts = Vec::new();
    for (key, usart) in table {
        let ctx = format!("[usart.{}]", key);
        let index = match key.parse::<u8>() {
            Ok(i) if i < 8 => i,
            _ => {
                errors.push(format!("{} key must be a USART number 0-7", ctx));
                continue;
            }
        };

        let register = match usart.get("route").and_then(|r| r.as_str()) {
            Some(r) => match ROUTE_REGISTERS.iter().position(|n| *n == r) {
                Some(i) => i as u8,
                None => {
                    errors.push(format!("{} route must be \"A\" or \"B\"", ctx));
                    0
                }
            },
            None => {
                errors.push(format!("{} missing 'route'", ctx));
                0
            }
        };

        let byte = |field: &str, errors: &mut Vec<String>| -> u8 {
            match usart.get(field).and_then(|v| v.as_integer()) {
                Some(v) if (0..=0xFF).contains(&v) => v as u8,
                Some(_) => {
                    errors.push(format!("{} {} must fit in a byte", ctx, field));
                    0
                }
                None => {
                    errors.push(format!("{} missing '{}'", ctx, field));
                    0
                }
            }
        };
        let mask = byte("mask", errors);
        let none_code = byte("none", errors);
        if none_code & !mask != 0 {
            errors.push(format!("{} none code has bits outside mask", ctx));
        }

        let mut groups = Vec::new();
        match usart.get("groups").and_then(|g| g.as_array()) {
            Some(list) if !list.is_empty() => {
                for (i, g) in list.iter().enumerate() {
                    let gctx = format!("{} groups[{}]", ctx, i);
                    let mux = match g.get("mux").and_then(|m| m.as_integer()) {
                        Some(m) if (0..=0xFF).contains(&m) && (m as u8) & !mask == 0 => m as u8,
                        _ => {
                            errors.push(format!("{} mux must lie within mask", gctx));
                            0
                        }
                    };
                    if mux == none_code {
                        errors.push(format!("{} mux equals the none code", gctx));
                    }

                    let mut lookup = |field: &str| -> Option<u8> {
                        let name = g.get(field)?.as_str()?;
                        let number = number_of(name);
                        if number.is_none() {
                            errors.push(format!("{} {} {} is not in 'pins'", gctx, field, name));
                        }
                        number
                    };
                    let tx = lookup("tx");
                    let xck = lookup("xck");
                    if tx.is_none() && xck.is_some() {
                        errors.push(format!("{} has xck but no tx", gctx));
                    }

                    // RX and XDIR are the next pin number; both must be the next bit
                    for (role, pin) in [("tx", tx), ("xck", xck)] {
                        if let Some(n) = pin {
                            let here = pins[usize::from(n)];
                            let next = pins.get(usize::from(n) + 1).copied().flatten();
                            let follows = matches!(
                                (here, next),
                                (Some(a), Some(b)) if a.port == b.port && b.bit == a.bit + 1
                            );
                            if !follows {
                                errors.push(format!(
                                    "{} pin after {} is not the next bit of its port",
                                    gctx, role
                                ));
                            }
                        }
                    }

                    groups.push(Group { mux, tx, xck });
                }
            }
            _ => errors.push(format!("{} needs a non-empty 'groups' array", ctx)),
        }

        usarts.push(UsartDef {
            index,
            register,
            mask,
            none_code,
            groups,
        });
    }

    usarts.sort_by_key(|u| u.index);
    for (expected, usart) in usarts.iter().enumerate() {
        if usize::from(usart.index) != expected {
            errors.push(format!("USART numbers must be contiguous from 0, found {}", usart.index));
            break;
        }
    }

    // Fields sharing a routing register must not overlap
    for (i, a) in usarts.iter().enumerate() {
        for b in &usarts[i + 1..] {
            if a.register == b.register && a.mask & b.mask != 0 {
                errors.push(format!(
                    "USART{} and USART{} route masks overlap",
                    a.index, b.index
                ));
            }
        }
    }

    usarts
}

fn pin_expr(pin: Option<u8>) -> String {
    match pin {
        Some(n) => format!("Some(Pin::new({}))", n),
        None => "None".to_string(),
    }
}

fn generate(variant: &str, layout: &Layout) -> String {
    let mut out = String::new();
    writeln!(out, "// Generated by build.rs from variants/{}.toml", variant).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "/// Package name").unwrap();
    writeln!(out, "pub const VARIANT: &str = {:?};", layout.name).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "/// Number of digital pin numbers, gaps included").unwrap();
    writeln!(out, "pub const NUM_DIGITAL_PINS: u8 = {};", layout.pins.len()).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "/// Number of USARTs on this package").unwrap();
    writeln!(out, "pub const USART_COUNT: usize = {};", layout.usarts.len()).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "/// Port and bit behind each digital pin number").unwrap();
    writeln!(
        out,
        "pub static PIN_LOCATIONS: [Option<PinLocation>; {}] = [",
        layout.pins.len()
    )
    .unwrap();
    for pin in &layout.pins {
        match pin {
            Some(loc) => writeln!(
                out,
                "    Some(PinLocation::new({}, {})),",
                loc.port, loc.bit
            )
            .unwrap(),
            None => writeln!(out, "    None,").unwrap(),
        }
    }
    writeln!(out, "];").unwrap();

    for usart in &layout.usarts {
        writeln!(out).unwrap();
        writeln!(
            out,
            "static USART{}_GROUPS: [PinGroup; {}] = [",
            usart.index,
            usart.groups.len()
        )
        .unwrap();
        for g in &usart.groups {
            writeln!(
                out,
                "    PinGroup::new({:#04x}, {}, {}),",
                g.mux,
                pin_expr(g.tx),
                pin_expr(g.xck)
            )
            .unwrap();
        }
        writeln!(out, "];").unwrap();
        writeln!(out).unwrap();
        writeln!(
            out,
            "/// USART{} pin groups (USARTROUTE{})",
            usart.index,
            ROUTE_REGISTERS[usize::from(usart.register)]
        )
        .unwrap();
        writeln!(
            out,
            "pub static USART{i}: PortPinTable = PortPinTable::new(&USART{i}_GROUPS, MuxRoute::new({}, {:#04x}, {:#04x}));",
            usart.register,
            usart.mask,
            usart.none_code,
            i = usart.index
        )
        .unwrap();
    }

    writeln!(out).unwrap();
    writeln!(out, "/// Pin-group tables indexed by USART number").unwrap();
    writeln!(
        out,
        "pub static USART_PINS: [&PortPinTable; USART_COUNT] = [{}];",
        layout
            .usarts
            .iter()
            .map(|u| format!("&USART{}", u.index))
            .collect::<Vec<_>>()
            .join(", ")
    )
    .unwrap();

    out
}
