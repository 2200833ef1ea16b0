use std::path::PathBuf;

use soul_trap::{
    load_container_dir, load_settings_file, log_error_chain, parse_record_catalog, ActorInventory,
    Caster, ContainerCapacity, ContainerMap, RecordId, RecordingSink, SoulSize, SoulSource,
    SoulTrapper, DEFAULT_CONTAINER_FILE_PREFIX,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: i64 = 100;

struct CliOptions {
    data_dir: PathBuf,
    soul: SoulSize,
    level: i64,
    npc_victim: bool,
    items: Vec<(RecordId, u32)>,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return;
    }
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("soul_trap_sim: {err}");
            print_help();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(options) {
        eprintln!("soul_trap_sim failed: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run(options: CliOptions) -> Result<(), String> {
    let settings_path = options.data_dir.join("soul_trap.toml");
    let settings = load_settings_file(&settings_path).map_err(|err| {
        log_error_chain(&err);
        err.to_string()
    })?;

    let records_path = options.data_dir.join("records.toml");
    let records = std::fs::read_to_string(&records_path)
        .map_err(|err| format!("read {}: {err}", records_path.display()))?;
    let catalog = parse_record_catalog(&records, &records_path.display().to_string())
        .map_err(|err| err.to_string())?;

    let specs = load_container_dir(&options.data_dir, DEFAULT_CONTAINER_FILE_PREFIX)
        .map_err(|err| err.to_string())?;
    let (map, report) = ContainerMap::build(&specs, &catalog).map_err(|err| {
        log_error_chain(&err);
        err.to_string()
    })?;
    tracing::info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "container map built"
    );
    map.log_contents();

    let items = if options.items.is_empty() {
        default_items(&map)
    } else {
        options.items
    };
    let mut caster = Caster::player(
        "Player",
        options.level,
        ActorInventory::with_items(items),
    );
    let mut victim = SoulSource::from_raw("Victim", options.soul.raw(), options.npc_victim);
    let mut sink = RecordingSink::default();

    let trapper = SoulTrapper::new(map, settings);
    let report = trapper.trap_soul_with_report(&mut caster, &mut victim, &mut sink);

    let output = serde_json::json!({
        "report": report,
        "notifications": sink
            .notifications
            .iter()
            .map(|notification| notification.message_key())
            .collect::<Vec<_>>(),
        "inventory": caster.inventory,
    });
    let text = serde_json::to_string_pretty(&output).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

/// One empty container of every loaded tier.
fn default_items(map: &ContainerMap) -> Vec<(RecordId, u32)> {
    ContainerCapacity::ALL
        .into_iter()
        .filter_map(|capacity| map.query(capacity, SoulSize::None).ok())
        .filter_map(|records| records.first().copied())
        .map(|record| (record, 1))
        .collect()
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        data_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"),
        soul: SoulSize::Grand,
        level: DEFAULT_LEVEL,
        npc_victim: false,
        items: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data" => {
                let value = iter.next().ok_or("--data requires a directory")?;
                options.data_dir = PathBuf::from(value);
            }
            "--soul" => {
                let value = iter.next().ok_or("--soul requires a size")?;
                options.soul =
                    SoulSize::parse(value).ok_or_else(|| format!("unknown soul size: {value}"))?;
            }
            "--level" => {
                let value = iter.next().ok_or("--level requires a number")?;
                options.level = value
                    .parse()
                    .map_err(|_| format!("invalid level: {value}"))?;
            }
            "--npc" => options.npc_victim = true,
            "--item" => {
                let value = iter.next().ok_or("--item requires <hex id>[=count]")?;
                options.items.push(parse_item(value)?);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn parse_item(value: &str) -> Result<(RecordId, u32), String> {
    let (id, count) = match value.split_once('=') {
        Some((id, count)) => (
            id,
            count
                .parse::<u32>()
                .map_err(|_| format!("invalid item count: {count}"))?,
        ),
        None => (value, 1),
    };
    let id = id.trim_start_matches("0x").trim_start_matches("0X");
    let id = u32::from_str_radix(id, 16).map_err(|_| format!("invalid item id: {id}"))?;
    Ok((RecordId(id), count))
}

fn print_help() {
    println!(
        "Usage: soul_trap_sim [--data <dir>] [--soul <size>] [--level <n>] [--npc] [--item <hex id>[=count]]..."
    );
    println!("  --data   directory holding soul_trap.toml, records.toml and soul_trap_*.toml");
    println!("  --soul   none|petty|lesser|common|greater|grand|black (default grand)");
    println!("  --level  caster soul trap level (default {DEFAULT_LEVEL})");
    println!("  --npc    the victim is an NPC, so its soul is black");
    println!("  --item   container held by the caster; repeat as needed");
    println!("Without --item the caster holds one empty container of every tier.");
}
