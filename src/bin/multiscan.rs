//! Command-line driver: load a Snort-style ruleset, compile the selected
//! engine, and scan payload files as opaque byte blobs.
//!
//! ```text
//! multiscan -a d -r community.rules capture1.pcap capture2.pcap
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use structopt::StructOpt;

use multiscan::{rules, Algorithm, PatternSet, ScanConfig, Scanner};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "multiscan",
    about = "Offline multi-pattern content scanner for Snort-style rule sets"
)]
struct Opt {
    /// Algorithm selector: a (Aho-Corasick), d (Wu-Manber deterministic),
    /// p (Wu-Manber probabilistic), h (Set-Horspool), b (Boyer-Moore)
    #[structopt(short, long, default_value = "d")]
    algorithm: String,

    /// Snort rules file to take content:"..." patterns from
    #[structopt(short, long, parse(from_os_str))]
    rules: PathBuf,

    /// Target false-positive rate for the Bloom prefix gate (p mode)
    #[structopt(long, default_value = "0.01")]
    bloom_fp_rate: f64,

    /// Pin the Wu-Manber block size (2-4) instead of deriving it
    #[structopt(long)]
    block_size: Option<usize>,

    /// Treat every pattern as caseless
    #[structopt(long)]
    nocase: bool,

    /// Suppress per-match lines, print analytics only
    #[structopt(short, long)]
    quiet: bool,

    /// Payload files to scan as opaque byte streams
    #[structopt(parse(from_os_str), required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    pretty_env_logger::init();

    if let Err(err) = run(&Opt::from_args()) {
        eprintln!("multiscan: {:#}", err);
        exit(1);
    }
}

fn run(opt: &Opt) -> anyhow::Result<()> {
    let algorithm: Algorithm = opt.algorithm.parse()?;

    let patterns = rules::load_rules(&opt.rules)
        .with_context(|| format!("unable to load rules from {}", opt.rules.display()))?;
    let set = PatternSet::new(patterns)?;

    println!(
        "[+] loaded {} patterns (min {}, avg {} bytes)",
        set.len(),
        set.min_length(),
        set.avg_length()
    );

    let mut config = ScanConfig::new(algorithm);
    config.bloom_fp_rate = opt.bloom_fp_rate;
    config.block_size = opt.block_size;
    config.nocase_default = opt.nocase;

    let scanner = Scanner::new(set, config);
    let mut tallies = vec![0u64; scanner.patterns().len()];

    for file in &opt.files {
        let data = fs::read(file).with_context(|| format!("unable to read {}", file.display()))?;

        println!("\n=== scanning ({}): {} ===", algorithm, file.display());

        let report = scanner.scan(&data);

        for m in &report.matches {
            tallies[m.pattern as usize] += 1;

            if !opt.quiet {
                let pattern = &scanner.patterns()[m.pattern as usize];
                print!(
                    "match at {:>8}..{:<8} {}",
                    m.start,
                    m.end,
                    String::from_utf8_lossy(&pattern.bytes)
                );
                if let Some(sid) = pattern.sid {
                    print!("  (sid {})", sid);
                }
                if let Some(msg) = &pattern.msg {
                    print!("  {}", msg);
                }
                println!();
            }
        }

        println!("{}", report.stats);
    }

    let mut hits: Vec<(usize, u64)> = tallies
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, count)| count > 0)
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));

    if !hits.is_empty() {
        println!("\n[matches by pattern]");
        for (id, count) in hits {
            let pattern = &scanner.patterns()[id];
            println!(
                "  {:>6}  {}",
                count,
                String::from_utf8_lossy(&pattern.bytes)
            );
        }
    }

    Ok(())
}
