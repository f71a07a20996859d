use clap::Parser;
use plank::cli::commands::Cli;
use plank::cli::handlers;
use plank::logging;

fn main() {
    let cli = Cli::parse();
    let data_dir = handlers::data_dir(&cli);

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI, logging to a file so the screen stays clean
            logging::init_file(&data_dir);
            plank::tui::run(&data_dir)
        }
        Some(_) => {
            logging::init_stderr();
            handlers::dispatch(cli)
        }
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
