//! Synthetic message archive generator for benchmarking and demos.
//!
//! Usage: cargo run --features gen-test --bin gen_archive -- [messages] [output_dir]
//! Example: cargo run --features gen-test --bin gen_archive -- 100000 demo_archive
//!
//! Writes `messages.csv` (a record store) and `id_map.yaml` (an identity map)
//! into the output directory.

use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

const CONTACTS: &[(&str, &str)] = &[
    ("1", "Mom"),
    ("2", "Dad"),
    ("3", "Mom and Dad"),
    ("4", "Alice"),
    ("5", "Bob"),
    ("6", "Book Club"),
    ("7", "Иван"),
    ("8", "村上"),
];

/// Chats missing from the identity map; they load as "other".
const UNMAPPED_CHATS: &[&str] = &["90", "91", "92"];

const WORDS: &[&str] = &[
    "hey", "are", "you", "coming", "tonight", "dinner", "at", "seven", "sounds", "good",
    "can't", "wait", "party", "running", "late", "sorry", "love", "you", "call", "me",
    "later", "ok", "lol", "what", "time", "tomorrow", "beach", "weekend", "happy",
    "birthday", "frabjous", "day", "callooh", "callay", "the", "movie", "was", "great",
];

const EMOJIS: &[&str] = &["😂", "❤️", "👍", "🎉", "🔥", "😍", "🤔", "👋"];

const SERVICES: &[&str] = &["iMessage", "SMS"];

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let count: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100_000);
    let output = args.get(2).map(|s| s.as_str()).unwrap_or("demo_archive");

    println!("🧪 Archive Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Messages: {}", count);
    println!("   Output:   {}", output);
    println!();

    let dir = Path::new(output);
    fs::create_dir_all(dir)?;

    let start = std::time::Instant::now();
    generate_id_map(&dir.join("id_map.yaml"))?;
    generate_messages(count, &dir.join("messages.csv"))?;
    let elapsed = start.elapsed();

    println!("\n\n✅ Done!");
    println!("   Time: {:.2}s", elapsed.as_secs_f64());
    println!(
        "   Speed: {:.0} msg/s",
        count as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}

fn generate_id_map(path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (chat_id, name) in CONTACTS {
        writeln!(writer, "{}: \"{}\"", chat_id, name)?;
    }
    writer.flush()?;
    Ok(())
}

fn generate_messages(count: usize, path: &Path) -> Result<(), Box<dyn Error>> {
    let file = BufWriter::with_capacity(1024 * 1024, File::create(path)?); // 1MB buffer
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["chat_id", "guid", "text", "is_from_me", "date_utc", "service"])?;

    let mut rng = rand::thread_rng();
    let mut chats: Vec<&str> = CONTACTS.iter().map(|(id, _)| *id).collect();
    chats.extend_from_slice(UNMAPPED_CHATS);

    // Three years of history, starting 2017-01-01
    let mut now: DateTime<Utc> = DateTime::from_timestamp(1_483_228_800, 0).unwrap_or_default();
    let span_secs = 3 * 365 * 24 * 3600;
    let mean_gap = (span_secs / count.max(1) as i64).max(1);

    for i in 0..count {
        now += TimeDelta::seconds(rng.gen_range(0..=mean_gap * 2));

        // A few chats dominate, like a real archive
        let chat = if rng.gen_bool(0.6) {
            chats[rng.gen_range(0..3)]
        } else {
            chats.choose(&mut rng).copied().unwrap_or("1")
        };
        let text = generate_text(&mut rng);
        let is_from_me = if rng.gen_bool(0.5) { "1" } else { "0" };
        let service = SERVICES.choose(&mut rng).copied().unwrap_or("iMessage");
        let guid = format!("{:08X}-{:04X}", i, rng.gen_range(0..=0xFFFF_u32));
        let date_utc = now.format("%Y-%m-%d %H:%M:%S").to_string();

        writer.write_record([
            chat,
            guid.as_str(),
            text.as_str(),
            is_from_me,
            date_utc.as_str(),
            service,
        ])?;

        if (i + 1) % 10000 == 0 {
            eprint!("\r   Generated {}/{}", i + 1, count);
        }
    }

    writer.flush()?;
    Ok(())
}

fn generate_text(rng: &mut impl Rng) -> String {
    // Attachments and reactions have no text
    if rng.gen_ratio(1, 20) {
        return String::new();
    }
    let n = rng.gen_range(1..=20);
    let mut words: Vec<&str> = (0..n)
        .map(|_| WORDS.choose(rng).copied().unwrap_or("hey"))
        .collect();
    if rng.gen_ratio(1, 4) {
        words.push(EMOJIS.choose(rng).copied().unwrap_or("👍"));
    }
    words.join(" ")
}
