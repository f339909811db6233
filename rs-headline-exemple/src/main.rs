use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_headline_core::model::config::{GenerationConfig, TrainingConfig};
use rs_headline_core::model::corpus::Corpus;
use rs_headline_core::model::generator::Generator;
use rs_headline_core::model::trainer::Trainer;
use rs_headline_core::model::validator::HeadlinePolicy;

/// Trains a model on a folder of headlines and prints new ones.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding `.txt` corpus files (one headline per line)
    #[arg(long, default_value = "./data")]
    data: String,

    /// Number of context words
    #[arg(long, default_value_t = 2)]
    order: usize,

    /// Number of headlines to print
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Phrase every headline must contain ("none" to disable)
    #[arg(long, default_value = "florida man")]
    contains: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Load every .txt file of the data directory, duplicates are dropped
    let corpus = Corpus::load_dir(&args.data)?;
    println!("Loaded {} headlines from {:?}", corpus.len(), corpus.sources());

    // Order 0 is rejected here, before any training
    let trainer = Trainer::new(TrainingConfig::new(args.order)?);
    let model = trainer.train_parallel(&corpus)?;
    println!("Trained an order-{} model with {} histories", model.order(), model.len());

    // Headlines must be 5 to 20 words long and must not be in the corpus
    let mut policy = HeadlinePolicy::default();
    policy.exclude_corpus(&corpus);
    if args.contains.eq_ignore_ascii_case("none") {
        policy.set_required_phrase(None);
    } else {
        policy.set_required_phrase(Some(args.contains.as_str()));
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let generator = Generator::new(GenerationConfig::default());
    let batch = generator.generate_batch(&model, args.count, &policy, &mut rng);
    for (i, headline) in batch.headlines.iter().enumerate() {
        println!("{}. {}", i + 1, headline);
    }

    if batch.exhausted {
        println!(
            "\nFailed to construct headline after {} attempts. Try decreasing the order or adding more training data.",
            batch.attempts
        );
    }

    Ok(())
}
