use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use market_packet::{PacketGenerator, PacketProcessor};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about = "Generate and process binary market update packet streams")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synthesize a stream of random packets into a file
    Generate {
        /// Output file for the packet stream
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Number of packets to write
        #[arg(long, default_value_t = 2)]
        packets: usize,

        /// Per-packet update cap; each packet gets a uniform count in [1, cap]
        #[arg(long, default_value_t = 10)]
        max_updates: usize,

        /// RNG seed; picked at random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Read a packet stream and print its trades as text
    Process {
        /// Input packet stream to read
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output text file; stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Stop after this many packets; omit to read to end of stream
        #[arg(long)]
        packets: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Args::parse().command {
        Command::Generate {
            output,
            packets,
            max_updates,
            seed,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let sink = BufWriter::new(
                File::create(&output).with_context(|| format!("create {:?}", output))?,
            );

            let mut generator = PacketGenerator::new(sink, seed);
            generator.initialize();
            generator
                .generate_packets(packets, max_updates)
                .with_context(|| format!("generate {} packets", packets))?;

            generator
                .into_sink()
                .flush()
                .with_context(|| format!("flush {:?}", output))?;
            info!("wrote {} packets to {:?} (seed {})", packets, output, seed);
        }

        Command::Process {
            input,
            output,
            packets,
        } => {
            let source = File::open(&input).with_context(|| format!("open {:?}", input))?;
            let sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("create {:?}", path))?,
                )),
                None => Box::new(std::io::stdout().lock()),
            };

            let mut processor = PacketProcessor::new(source, sink);
            processor.initialize();

            match processor.process_next_packet(packets) {
                Ok(()) => {}
                Err(e) if e.is_end_of_file() => info!("reached end of stream"),
                Err(e) => return Err(e).context("process packet stream"),
            }
            processor.into_sink().flush().context("flush output")?;
        }
    }

    Ok(())
}
