// Colored terminal output for cluster lists.
//
// This module handles all terminal-specific formatting: colors, score
// bars, summaries. The main.rs display code delegates here.

use colored::Colorize;

use crate::cluster::Clustering;

/// Display a clustering as a ranked, scannable list.
pub fn display_clustering(heading: &str, clustering: &Clustering) {
    println!(
        "\n{}",
        format!(
            "=== {heading} ({} documents) ===",
            clustering.document_count
        )
        .bold()
    );
    println!();

    let bar_width: usize = 20;

    for (i, cluster) in clustering.topical().enumerate() {
        let filled = (cluster.score * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.min(bar_width)),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        let colored_bar = if cluster.score >= 0.66 {
            bar.bright_green()
        } else if cluster.score >= 0.33 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  {:>2}. {:<36} {} {:.2}  ({} docs)",
            i + 1,
            cluster.label.bold(),
            colored_bar,
            cluster.score,
            cluster.size(),
        );

        let ids = cluster.documents.join(", ");
        println!("      Documents: {}", ids.dimmed());
        println!();
    }

    let residual = clustering.residual();
    if residual.size() > 0 {
        println!(
            "  {} {} ({} docs)",
            "~".yellow(),
            residual.label.dimmed(),
            residual.size(),
        );
        println!("      Documents: {}", residual.documents.join(", ").dimmed());
    } else {
        println!("  {} every document was clustered", "ok".green());
    }
}
