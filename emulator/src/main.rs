mod sim;

use std::env;
use std::io::{self, Write};
use std::process;

use sim::SignalProfile;

fn main() -> io::Result<()> {
    let (profile, duration_ms) = parse_args().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!(
            "Usage: pulse-gate-emulator [--profile <nominal|late-rise|chatter|rotation>] [--ms <duration>]"
        );
        process::exit(2);
    });

    let duration_ms = duration_ms.unwrap_or_else(|| profile.default_duration_ms());
    let report = sim::run(profile, duration_ms);

    let stdout = io::stdout();
    let mut writer = stdout.lock();

    writeln!(
        writer,
        "Replaying `{}` for {duration_ms} ms of simulated time.",
        profile.label()
    )?;
    for line in &report.transcript {
        writeln!(writer, "{line}")?;
    }

    let counters = report.counters;
    writeln!(
        writer,
        "Summary: {} edges accepted, {} ignored, {} timeouts, {} activations, \
         {} bursts completed, {} line transitions.",
        counters.edges_accepted,
        counters.edges_ignored,
        counters.timeouts,
        counters.activations,
        counters.bursts_completed,
        counters.line_events,
    )?;

    Ok(())
}

fn parse_args() -> Result<(SignalProfile, Option<u64>), String> {
    let mut profile = SignalProfile::Nominal;
    let mut duration_ms = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--profile=") {
            profile = SignalProfile::from_tag(value)?;
        } else if arg == "--profile" {
            let value = args.next().ok_or("Expected value after --profile")?;
            profile = SignalProfile::from_tag(&value)?;
        } else if let Some(value) = arg.strip_prefix("--ms=") {
            duration_ms = Some(parse_duration(value)?);
        } else if arg == "--ms" {
            let value = args.next().ok_or("Expected value after --ms")?;
            duration_ms = Some(parse_duration(&value)?);
        } else {
            profile = SignalProfile::from_tag(&arg)?;
        }
    }

    Ok((profile, duration_ms))
}

fn parse_duration(value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid duration `{value}`"))
}
