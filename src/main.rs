use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::process;
use std::time::Instant;

use log::info;

use wikiprof::classifier::{BayesModel, Classifier};
use wikiprof::config::{CorpusMode, RunConfig};
use wikiprof::error::Result;
use wikiprof::evaluate::Evaluator;
use wikiprof::pipeline::{self, CorpusVectors};
use wikiprof::store;
use wikiprof::vector::VectorBuilder;
use wikiprof::vocabulary::{self, Vocabulary};
use wikiprof::ProfessionCatalog;

fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return;
    }
    let config = match RunConfig::from_args(args.into_iter()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[error] {}", e);
            print_usage();
            process::exit(2);
        }
    };
    if let Err(e) = run(&config) {
        eprintln!("[error] {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: wikiprof --mode train|test --corpus FILE --vocabulary FILE --num-docs N");
    eprintln!("               [--build-vocab] [--professions FILE] [--vectors FILE]");
    eprintln!("               [--train] [--train-vectors FILE] [--model FILE] [--report FILE]");
    eprintln!();
    eprintln!("train mode: builds labeled training vectors from the corpus.");
    eprintln!("test mode:  builds test vectors, optionally retrains the model, and");
    eprintln!("            evaluates top-3 predictions against the profession catalog.");
}

fn run(config: &RunConfig) -> Result<()> {
    let start = Instant::now();

    let lines = pipeline::read_lines(&config.corpus_path)?;
    info!("read {} corpus records from {}", lines.len(), config.corpus_path.display());

    // phase 1: the vocabulary table must be complete before any vector is
    // built, since feature indices and IDF weights are corpus-wide
    let vocabulary = if config.build_vocab {
        let vocabulary = vocabulary::build_vocabulary(&lines);
        vocabulary.save(&config.vocabulary_path)?;
        info!(
            "built vocabulary with {} lemmas, wrote {}",
            vocabulary.len(),
            config.vocabulary_path.display()
        );
        vocabulary
    } else {
        let vocabulary = Vocabulary::load(&config.vocabulary_path)?;
        info!(
            "loaded vocabulary with {} lemmas from {}",
            vocabulary.len(),
            config.vocabulary_path.display()
        );
        vocabulary
    };

    let catalog = ProfessionCatalog::load(&config.catalog_path)?;
    info!(
        "loaded {} catalog entries from {}",
        catalog.len(),
        config.catalog_path.display()
    );

    // phase 2
    let builder = VectorBuilder::new(&vocabulary, &catalog, config.num_documents, config.mode);
    match pipeline::vectorize_corpus(&lines, &builder) {
        CorpusVectors::Training(examples) => {
            store::write_training(&config.vectors_path, &examples)?;
            info!(
                "wrote {} training vectors to {}",
                examples.len(),
                config.vectors_path.display()
            );
        }
        CorpusVectors::Test(examples) => {
            store::write_test(&config.vectors_path, &examples)?;
            info!(
                "wrote {} test vectors to {}",
                examples.len(),
                config.vectors_path.display()
            );
            evaluate(config, &vocabulary, examples)?;
        }
    }

    info!("done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn evaluate(
    config: &RunConfig,
    vocabulary: &Vocabulary,
    examples: Vec<wikiprof::TestExample>,
) -> Result<()> {
    debug_assert_eq!(config.mode, CorpusMode::Test);

    let model = if config.train {
        let training = store::read_training(&config.training_vectors_path)?;
        info!(
            "training on {} vectors from {}",
            training.len(),
            config.training_vectors_path.display()
        );
        let model = BayesModel::train(&training, vocabulary.len())?;
        model.save(&config.model_path)?;
        info!("wrote model to {}", config.model_path.display());
        model
    } else {
        BayesModel::load(&config.model_path)?
    };
    info!(
        "model: {} features, {} labels",
        model.num_features(),
        model.num_categories()
    );

    let evaluator = Evaluator::new(&model, model.labels(), examples.len())?;
    let report = BufWriter::new(File::create(&config.report_path)?);
    let summary = evaluator.evaluate(&examples, report)?;
    info!("wrote prediction report to {}", config.report_path.display());

    println!("Percent correct predictions : {:.2}%", summary.accuracy());
    Ok(())
}
