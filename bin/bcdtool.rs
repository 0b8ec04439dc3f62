//! Command-line front-end for inspecting and editing BCD store files.

use bcd_store::{
    load_from_hive, lookup_by_id, lookup_by_name, serialize_to_hive, BcdStore, Element,
    ElementKind, ElementValue, Guid, Hive, Object,
};
use clap::{Arg, ArgMatches, Command};
use std::fs;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("bcdtool")
        .about("Inspect and edit Windows BCD store files")
        .version(bcd_store::VERSION)
        .arg(
            Arg::new("store")
                .short('s')
                .long("store")
                .value_name("FILE")
                .help("Path to the BCD store file")
                .required(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("enum")
                .about("List objects and their elements")
                .arg(Arg::new("id").value_name("GUID").help("Only this object")),
        )
        .subcommand(
            Command::new("create")
                .about("Add a new object")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .value_name("GUID")
                        .help("Identifier for the new object (random if omitted)"),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("HEX")
                        .help("Application type code (default 0)"),
                )
                .arg(
                    Arg::new("description")
                        .short('d')
                        .long("description")
                        .value_name("TEXT")
                        .help("Initial description element"),
                ),
        )
        .subcommand(
            Command::new("copy")
                .about("Duplicate an object under a fresh identifier")
                .arg(Arg::new("id").value_name("GUID").required(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Remove an object")
                .arg(Arg::new("id").value_name("GUID").required(true)),
        )
        .subcommand(
            Command::new("set")
                .about("Insert or replace an element")
                .arg(Arg::new("id").value_name("GUID").required(true))
                .arg(
                    Arg::new("name")
                        .value_name("NAME|HEX")
                        .required(true)
                        .help("Friendly element name or hex type code"),
                )
                .arg(Arg::new("value").value_name("VALUE").required(true)),
        )
}

fn load(path: &str) -> Result<BcdStore, String> {
    let data = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let hive = Hive::from_vec(data).map_err(|e| format!("Invalid hive format: {}", e))?;
    let mut store = BcdStore::new();
    load_from_hive(&mut store, &hive).map_err(|e| format!("Failed to parse BCD store: {}", e))?;
    Ok(store)
}

fn save(path: &str, store: &BcdStore) -> Result<(), String> {
    let bytes = serialize_to_hive(store).map_err(|e| format!("Serialization failed: {}", e))?;
    fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {}", path, e))
}

fn parse_guid(text: &str) -> Result<Guid, String> {
    Guid::parse(text).map_err(|_| format!("Invalid object identifier format: {}", text))
}

fn print_element(element: &Element) {
    let label = match lookup_by_id(element.element_type) {
        Some(info) => format!("{:#010x} ({})", element.element_type, info.name),
        None => format!("{:#010x}", element.element_type),
    };
    match &element.value {
        ElementValue::Integer(v) => println!("    element {} : integer {}", label, v),
        ElementValue::String(s) => println!("    element {} : string \"{}\"", label, s),
        ElementValue::Boolean(b) => println!("    element {} : boolean {}", label, b),
        ElementValue::Binary(d) if d.len() <= 16 => {
            println!("    element {} : binary {}", label, hex::encode(d))
        }
        ElementValue::Binary(d) => {
            println!("    element {} : binary ({} bytes)", label, d.len())
        }
        ElementValue::Unknown => println!("    element {} : unknown", label),
    }
}

fn print_object(object: &Object) {
    println!("----------------------------------------");
    println!("identifier              {}", object.id);
    println!("type                    {:#010x}", object.object_type);
    for element in object.elements() {
        print_element(element);
    }
}

fn cmd_enum(store: &BcdStore, matches: &ArgMatches) -> Result<(), String> {
    if let Some(text) = matches.get_one::<String>("id") {
        let id = parse_guid(text)?;
        let object = store
            .find_object(&id)
            .ok_or_else(|| format!("Object not found: {}", id))?;
        print_object(object);
    } else {
        for object in store.objects() {
            print_object(object);
        }
    }
    Ok(())
}

fn cmd_create(store: &mut BcdStore, matches: &ArgMatches) -> Result<(), String> {
    let id = match matches.get_one::<String>("id") {
        Some(text) => parse_guid(text)?,
        None => Guid::random(),
    };
    if store.find_object(&id).is_some() {
        return Err(format!("Object already exists: {}", id));
    }

    let object_type = match matches.get_one::<String>("type") {
        Some(text) => u32::from_str_radix(text.trim_start_matches("0x"), 16)
            .map_err(|_| format!("Invalid type code: {}", text))?,
        None => 0,
    };

    let mut object = Object::new(id, object_type);
    if let Some(description) = matches.get_one::<String>("description") {
        let element = Element::string(0x12000004, description.as_str())
            .map_err(|e| e.to_string())?;
        object.set_element(element).map_err(|e| e.to_string())?;
    }

    store.set_object(object).map_err(|e| e.to_string())?;
    println!("The entry {} was successfully created.", id);
    Ok(())
}

fn cmd_copy(store: &mut BcdStore, matches: &ArgMatches) -> Result<(), String> {
    let id = parse_guid(matches.get_one::<String>("id").expect("required"))?;
    let source = store
        .find_object(&id)
        .ok_or_else(|| format!("Object not found: {}", id))?;

    let mut copy = source.clone();
    copy.id = Guid::random();
    let new_id = copy.id;

    store.set_object(copy).map_err(|e| e.to_string())?;
    println!("The entry was successfully copied to {}.", new_id);
    Ok(())
}

fn cmd_delete(store: &mut BcdStore, matches: &ArgMatches) -> Result<(), String> {
    let id = parse_guid(matches.get_one::<String>("id").expect("required"))?;
    store.delete_object(&id).map_err(|e| e.to_string())?;
    println!("The entry {} was successfully deleted.", id);
    Ok(())
}

/// Resolves an element name or hex type code to (type, kind).
///
/// Unknown hex codes default to String, the most common element payload.
fn resolve_element(name: &str) -> Result<(u32, ElementKind), String> {
    if let Some(info) = lookup_by_name(name) {
        return Ok((info.id, info.kind));
    }
    let element_type = u32::from_str_radix(name.trim_start_matches("0x"), 16)
        .map_err(|_| format!("Unknown element: {}", name))?;
    let kind = lookup_by_id(element_type)
        .map(|info| info.kind)
        .unwrap_or(ElementKind::String);
    Ok((element_type, kind))
}

fn parse_element_value(element_type: u32, kind: ElementKind, text: &str) -> Result<Element, String> {
    match kind {
        ElementKind::Integer => {
            let v = if let Some(hex) = text.strip_prefix("0x") {
                u64::from_str_radix(hex, 16)
            } else {
                text.parse::<u64>()
            }
            .map_err(|_| format!("Invalid integer value: {}", text))?;
            Ok(Element::integer(element_type, v))
        }
        ElementKind::Boolean => match text {
            "true" | "yes" | "on" | "1" => Ok(Element::boolean(element_type, true)),
            "false" | "no" | "off" | "0" => Ok(Element::boolean(element_type, false)),
            _ => Err(format!("Invalid boolean value: {}", text)),
        },
        ElementKind::Binary => {
            let data = hex::decode(text).map_err(|_| format!("Invalid hex data: {}", text))?;
            Element::binary(element_type, data).map_err(|e| e.to_string())
        }
        ElementKind::String | ElementKind::Unknown => {
            Element::string(element_type, text).map_err(|e| e.to_string())
        }
    }
}

fn cmd_set(store: &mut BcdStore, matches: &ArgMatches) -> Result<(), String> {
    let id = parse_guid(matches.get_one::<String>("id").expect("required"))?;
    let name = matches.get_one::<String>("name").expect("required");
    let value = matches.get_one::<String>("value").expect("required");

    let (element_type, kind) = resolve_element(name)?;
    let element = parse_element_value(element_type, kind, value)?;

    let object = store
        .find_object_mut(&id)
        .ok_or_else(|| format!("Object not found: {}", id))?;
    object.set_element(element).map_err(|e| e.to_string())?;
    println!("The operation completed successfully.");
    Ok(())
}

fn run() -> Result<(), String> {
    let matches = cli().get_matches();
    let store_path = matches.get_one::<String>("store").expect("required");

    match matches.subcommand() {
        Some(("enum", sub)) => {
            let store = load(store_path)?;
            cmd_enum(&store, sub)
        }
        Some(("create", sub)) => {
            let mut store = load(store_path)?;
            cmd_create(&mut store, sub)?;
            save(store_path, &store)
        }
        Some(("copy", sub)) => {
            let mut store = load(store_path)?;
            cmd_copy(&mut store, sub)?;
            save(store_path, &store)
        }
        Some(("delete", sub)) => {
            let mut store = load(store_path)?;
            cmd_delete(&mut store, sub)?;
            save(store_path, &store)
        }
        Some(("set", sub)) => {
            let mut store = load(store_path)?;
            cmd_set(&mut store, sub)?;
            save(store_path, &store)
        }
        _ => unreachable!("subcommand required"),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
