//! Stdout rendering of an [`Aggregator`]'s results.
//!
//! Ported line-for-line from
//! `original_source/src/gaussian_mean_hypotheses/main.cpp`'s `separator`,
//! `cat`, and `program::run` functions.

use nalgebra::DMatrix;

use crate::aggregator::Aggregator;
use crate::error::Result;
use crate::moment_statistic::MomentStatistic;

const SEPARATOR_WIDTH: usize = 70;

pub fn separator() {
    println!("{}", "=".repeat(SEPARATOR_WIDTH));
}

pub fn print_header(simulations: usize, mu_sim: f64, mu_cm: f64) {
    separator();
    println!("Simulations: {}", simulations);
    println!("Simulated signal strength: {}", mu_sim);
    println!("Change of measure signal strength: {}", mu_cm);
    separator();
}

/// Print the four corner values of `stat`'s mean matrix (transformed by
/// `transform`), plus a standard-error bound derived from the max cell
/// variance divided by the replication count.
pub fn cat<F: Fn(f64) -> f64>(stat: &MomentStatistic<DMatrix<f64>>, transform: F) {
    let mean = stat.mean();
    let m = mean.nrows();
    let n = mean.ncols();
    if m == 0 || n == 0 {
        return;
    }

    println!(
        "{:<10}{:<10}{:<10}",
        transform(mean[(0, 0)]),
        "---",
        transform(mean[(0, n - 1)])
    );
    println!("{:<10}{:<10}", "", "...");
    println!(
        "{:<10}{:<10}{:<10}",
        transform(mean[(m - 1, 0)]),
        "---",
        transform(mean[(m - 1, n - 1)])
    );

    let variance = stat.variance();
    let max_variance = variance.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let standard_error = (max_variance / stat.count() as f64).sqrt();
    println!("SE = {}", standard_error);
}

fn cat_identity(stat: &MomentStatistic<DMatrix<f64>>) {
    cat(stat, |x| x)
}

fn cat_neg_log10(stat: &MomentStatistic<DMatrix<f64>>) {
    cat(stat, |x| -x.log10())
}

/// Print the full result block for one simulation's aggregator, in the
/// order the original implementation used: sample sizes, then direct
/// errors, then importance errors.
pub fn print_aggregator(aggregator: &Aggregator) -> Result<()> {
    let sample_size = aggregator.sample_size()?;
    println!("ASPRT sample size:");
    cat_identity(&sample_size.asprt);
    separator();
    println!("GSPRT sample size:");
    cat_identity(&sample_size.gsprt);
    separator();

    let direct = aggregator.direct_error_indicator()?;
    println!("ASPRT direct error (log base 10):");
    cat_neg_log10(&direct.asprt);
    separator();
    println!("GSPRT direct error (log base 10):");
    cat_neg_log10(&direct.gsprt);
    separator();

    let importance = aggregator.importance_error_indicator()?;
    println!("ASPRT importance error (log base 10):");
    cat_neg_log10(&importance.asprt);
    separator();
    println!("GSPRT importance error (log base 10):");
    cat_neg_log10(&importance.gsprt);
    separator();

    Ok(())
}

pub fn print_elapsed(elapsed_seconds: f64) {
    println!("Total elapsed time: {} seconds.", elapsed_seconds);
    separator();
}
