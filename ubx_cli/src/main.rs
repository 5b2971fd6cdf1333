use clap::{Arg, ArgAction, Command};
use log::{error, info};
use std::fs::File;
use std::io::{self, BufReader, Read};
use ubx_decoder::*;

fn main() {
    env_logger::init();

    let matches = Command::new("u-blox raw data decoder")
        .author(clap::crate_authors!())
        .about("Decodes UBX raw measurement and subframe streams")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .required(false)
                .help("UBX log to decode, standard input if omitted"),
        )
        .arg(
            Arg::new("opt")
                .short('o')
                .long("opt")
                .value_name("OPTIONS")
                .default_value("")
                .allow_hyphen_values(true)
                .help("Receiver options, e.g. \"-TADJ=1.0 -INVCP -EPHALL -STD_SLIP=15\""),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print events and observation epochs as JSON lines"),
        )
        .subcommand(
            Command::new("gen")
                .about("Print the UBX frame of a CFG command as hex")
                .arg(
                    Arg::new("command")
                        .required(true)
                        .num_args(1..)
                        .allow_hyphen_values(true)
                        .help("Command line, e.g. CFG-RATE 1000 1"),
                ),
        )
        .get_matches();

    if let Some(("gen", sub_matches)) = matches.subcommand() {
        let command = sub_matches
            .get_many::<String>("command")
            .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let frame = gen_ubx(&command);
        if frame.is_empty() {
            eprintln!("Unknown command \"{}\"", command);
            std::process::exit(1);
        }
        let hex: Vec<String> = frame.iter().map(|b| format!("{:02x}", b)).collect();
        println!("{}", hex.join(" "));
        return;
    }

    let config: DecoderConfig = matches
        .get_one::<String>("opt")
        .map(|s| s.parse())
        .transpose()
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        })
        .unwrap_or_default();
    let json = matches.get_flag("json");

    let mut reader: Box<dyn Read> = match matches.get_one::<String>("input") {
        Some(path) => {
            let file = File::open(path).unwrap_or_else(|e| {
                eprintln!("Failed to open \"{}\". Error: {}", path, e);
                std::process::exit(1);
            });
            Box::new(BufReader::new(file))
        },
        None => Box::new(BufReader::new(io::stdin().lock())),
    };

    let mut decoder = UbxDecoder::new().with_config(config);
    let mut framing_errors = 0usize;
    let mut data_errors = 0usize;
    let mut epochs = 0usize;
    loop {
        match decoder.feed_frame(&mut reader) {
            Ok(DecodeEvent::NoMessage) => {},
            Ok(event) => {
                if let DecodeEvent::ObservationsReady { .. } = event {
                    epochs += 1;
                }
                print_event(&decoder, &event, json);
            },
            Err(DecodeError::EndOfStream) => break,
            Err(DecodeError::Io(kind)) => {
                error!("read failed: {:?}", kind);
                break;
            },
            Err(e) => {
                if e.is_framing() {
                    framing_errors += 1;
                } else {
                    data_errors += 1;
                }
                info!("{}", e);
            },
        }
    }
    info!(
        "{} observation epochs, {} framing errors, {} rejected messages",
        epochs, framing_errors, data_errors
    );
}

fn print_event(decoder: &UbxDecoder, event: &DecodeEvent, json: bool) {
    if json {
        match event {
            DecodeEvent::ObservationsReady { .. } => {
                println!("{}", serde_json::to_string(decoder.observations()).unwrap_or_default())
            },
            _ => println!("{}", serde_json::to_string(event).unwrap_or_default()),
        }
        return;
    }
    match event {
        DecodeEvent::ObservationsReady { time, count } => {
            println!("{} {} satellites", time, count);
            for obs in decoder.observations().iter() {
                println!(
                    "  {} P={:.3} L={:.3} D={:.3} S={} {:?}",
                    obs.sv,
                    obs.pseudorange[0],
                    obs.carrier_phase[0],
                    obs.doppler[0],
                    obs.snr[0],
                    obs.code[0]
                );
            }
        },
        other => println!("{:?}", other),
    }
}
