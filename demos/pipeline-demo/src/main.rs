use consumer_framework::{drop, drop_while, fold, head, take, take_while, ConsumerState};
use pipeline_core::{run, DriveError, Driver, DriverConfig, IterSource, Pipeline};
use signal_framework::Signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "pipeline_core=debug".parse() {
        filter = filter.add_directive(d);
    }
    if let Ok(d) = "pipeline_demo=info".parse() {
        filter = filter.add_directive(d);
    }

    fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), DriveError> {
    init_logging();

    // A frame is "<len>:<payload>", several frames back to back.
    let input = b"5:hello3:abc11:hello world";
    println!("Input: {}", String::from_utf8_lossy(input));

    let frames = (0..3).map(|_| frame()).collect();
    let pipeline = Pipeline::with_config(
        IterSource::new(input.iter().copied()),
        frames,
        DriverConfig::new().with_label("frames"),
    );
    let (payloads, leftover) = pipeline.run()?;

    println!("Frames decoded by the pipeline:");
    for (idx, payload) in payloads.iter().enumerate() {
        println!("  Frame {idx}: {payload:?}");
    }
    println!("Leftover: {leftover}");

    // The same consumer fed in arbitrary chunks.
    let mut driver = Driver::new(word_count());
    for chunk in ["the quick br", "own fox ", "jumps"] {
        let undelivered = driver.feed(chunk.chars())?;
        info!(chunk, undelivered = undelivered.len(), "fed chunk");
    }
    let (words, _) = driver.finish()?;
    println!("Words: {words}");

    // Skip a header line, then sum the digits of the body.
    let body = line().flat_map(|_| digit_sum());
    let (sum, _) = run(body, "header\n1 2 3 4".chars())?;
    println!("Digit sum after header: {sum}");

    let (fourth, rest) = run(drop(3).flat_map(|_| head()), "abcd".chars())?;
    println!("Fourth char: {fourth:?} (leftover {rest})");

    Ok(())
}

// --- Consumers -------------------------------------------------------------------------

fn frame() -> ConsumerState<u8, String> {
    take_while(|b: &u8| b.is_ascii_digit())
        .flat_map(|digits: Vec<u8>| {
            let len = digits
                .iter()
                .fold(0usize, |n, d| n * 10 + usize::from(d - b'0'));
            head().flat_map(move |_colon: Option<u8>| take(len))
        })
        .map(|payload| String::from_utf8_lossy(&payload).into_owned())
}

fn line() -> ConsumerState<char, String> {
    take_while(|c: &char| *c != '\n')
        .flat_map(|chars| head().map(move |_| chars.iter().collect::<String>()))
}

fn digit_sum() -> ConsumerState<char, u32> {
    fold(|acc: u32, c: char| acc + c.to_digit(10).unwrap_or(0), 0)
}

fn word_count() -> ConsumerState<char, usize> {
    let word = || {
        drop_while(|c: &char| c.is_whitespace())
            .flat_map(|_| take_while(|c: &char| !c.is_whitespace()))
    };
    fold_words(word, 0)
}

fn fold_words<W>(word: W, seen: usize) -> ConsumerState<char, usize>
where
    W: Fn() -> ConsumerState<char, Vec<char>> + Clone + 'static,
{
    let next = word.clone();
    word().flat_map(move |chars| {
        if chars.is_empty() {
            ConsumerState::done(seen, Signal::Eof)
        } else {
            fold_words(next.clone(), seen + 1)
        }
    })
}
