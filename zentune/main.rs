use clap::{CommandFactory, Parser};
use std::process::ExitCode;

use zentune::{apply, list, MsrDevice, PstateRequest, Result, SysMsr};
use zentune_raw::pstate::Pstate;

#[derive(Parser, Debug)]
#[command(name = "zentune")]
#[command(about = "P-state control for AMD Ryzen processors")]
struct Args {
    #[arg(short, long, help = "List all P-states")]
    list: bool,

    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u8).range(0..8),
        help = "P-state to inspect/modify (0-7)"
    )]
    pstate: Option<u8>,

    #[arg(long, requires = "pstate", help = "Enable the selected P-state")]
    enable: bool,

    #[arg(
        long,
        requires = "pstate",
        conflicts_with = "enable",
        help = "Disable the selected P-state"
    )]
    disable: bool,

    #[arg(
        short,
        long,
        value_parser = parse_hex,
        requires = "pstate",
        help = "FID to set (in hex)"
    )]
    fid: Option<u8>,

    #[arg(
        short,
        long,
        value_parser = parse_hex,
        requires = "pstate",
        help = "DID to set (in hex)"
    )]
    did: Option<u8>,

    #[arg(
        short,
        long,
        value_parser = parse_hex,
        requires = "pstate",
        help = "VID to set (in hex)"
    )]
    vid: Option<u8>,

    #[arg(long, help = "Enable verbose logging (shows all MSR read/write operations)")]
    verbose: bool,
}

/// Parse a hexadecimal field value, with or without a leading `0x`
fn parse_hex(s: &str) -> std::result::Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

/// Render a decoded P-state the way `--list` and the modify path print it
fn format_pstate(pstate: &Pstate) -> String {
    match pstate {
        Pstate::Disabled => "Disabled".to_string(),
        Pstate::Enabled(def) => format!(
            "Enabled - FID = {:X} - DID = {:X} - VID = {:X} - Ratio = {:.2} - vCore = {:.5}",
            def.fid,
            def.did,
            def.vid,
            def.ratio(),
            def.vcore()
        ),
    }
}

fn modify_pstate(device: &impl MsrDevice, args: &Args, index: usize) -> Result<()> {
    let mut request = PstateRequest::new(index);
    if args.enable {
        request.enable = Some(true);
    }
    if args.disable {
        request.enable = Some(false);
    }
    request.fid = args.fid;
    request.did = args.did;
    request.vid = args.vid;

    let update = apply(device, &request)?;

    println!("Current P{index}: {}", format_pstate(&Pstate::decode(update.old)));
    if args.enable {
        println!("Enabling state");
    }
    if args.disable {
        println!("Disabling state");
    }
    if let Some(fid) = args.fid {
        println!("Setting FID to {fid:X}");
    }
    if let Some(did) = args.did {
        println!("Setting DID to {did:X}");
    }
    if let Some(vid) = args.vid {
        println!("Setting VID to {vid:X}");
    }
    if update.written {
        println!("New P{index}: {}", format_pstate(&Pstate::decode(update.new)));
    }

    Ok(())
}

/// Returns whether any action was taken
fn run(args: &Args) -> Result<bool> {
    // P-state MSRs are per-core but firmware programs them identically;
    // CPU 0's device is the single target.
    let device = SysMsr::new(0);

    if args.list {
        for (index, pstate) in list(&device)?.iter().enumerate() {
            println!("P{index} - {}", format_pstate(pstate));
        }
    }

    if let Some(index) = args.pstate {
        modify_pstate(&device, args, index as usize)?;
    }

    if !args.list && args.pstate.is_none() {
        let _ = Args::command().print_help();
        return Ok(false);
    }

    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        // Usage was printed; "no action taken" is distinct from both
        // success-with-action and error.
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
