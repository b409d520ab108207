use std::env;
use std::fs::File;
use std::process::ExitCode;

use credit_risk::analysis;
use credit_risk::evaluation::evaluate;
use credit_risk::mlp::{Activation, LearningRate, MultilayerPerceptron, Solver};
use credit_risk::model_selection::{GridSearch, ParamGrid};
use credit_risk::preprocessing::Preprocessor;
use credit_risk::split::stratified_split;
use credit_risk::{Dataset, Result};

/// Fraction of records held out for the final evaluation.
const TEST_FRACTION: f64 = 0.3;
/// One seed drives the split shuffle and every candidate's weight init.
const SEED: u64 = 42;
/// Cross-validation folds used by the grid search.
const FOLDS: usize = 2;

fn main() -> ExitCode {
    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: credit-risk <dataset.csv>");
            return ExitCode::FAILURE;
        }
    };
    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<()> {
    let credit = Dataset::from_reader(File::open(path)?)?;

    println!("{}", analysis::class_balance(&credit));
    println!("{}", analysis::numeric_summary(&credit));
    println!("{}", analysis::correlation(&credit));
    for column in ["credit_history", "purpose", "job"] {
        println!("{}", analysis::crosstab(&credit, column)?);
    }

    let (train, test) = stratified_split(&credit, TEST_FRACTION, SEED)?;

    let base = MultilayerPerceptron::params().max_iter(1000).seed(SEED);
    let grid = ParamGrid {
        activations: vec![
            Activation::Identity,
            Activation::Logistic,
            Activation::Tanh,
            Activation::Relu,
        ],
        solvers: vec![Solver::Sgd, Solver::Adam],
        learning_rates: vec![
            LearningRate::Constant,
            LearningRate::InvScaling,
            LearningRate::Adaptive,
        ],
    };

    let preprocessor = Preprocessor::fit(&train)?;
    let features = preprocessor.transform(&train);
    let outcome = GridSearch::new(grid, FOLDS).run(&features, train.labels(), &base)?;

    println!("grid search over {} candidates", outcome.scores.len());
    for score in &outcome.scores {
        println!("  {}  ->  {:.4}", score.candidate, score.mean_accuracy);
    }
    println!();
    println!("CV score for best MLP classifier: {:.2}", outcome.best_score);
    println!("best configuration: {}", outcome.best);
    println!();

    let evaluation = evaluate(&train, &test, &outcome.best.apply(base))?;
    println!("{}", evaluation);
    println!("accuracy on test: {:.2}", evaluation.accuracy());
    println!("recall (good): {:.2}", evaluation.positive_recall());

    Ok(())
}
