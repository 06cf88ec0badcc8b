mod cli;
mod fonts_cmd;
mod page_range;
mod placements_cmd;
mod shared;
mod summary_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Summary { ref file, max_depth } => summary_cmd::run(file, max_depth),
        cli::Commands::Placements {
            ref file,
            ref pages,
            ref format,
            unicode_norm,
            max_depth,
            warnings,
        } => placements_cmd::run(placements_cmd::PlacementsArgs {
            file,
            pages: pages.as_deref(),
            format,
            unicode_norm: unicode_norm.map(Into::into),
            max_depth,
            warnings,
        }),
        cli::Commands::Fonts {
            ref file,
            ref format,
        } => fonts_cmd::run(file, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
