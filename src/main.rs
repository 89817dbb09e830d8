use clap::Parser;
use fiche::cli::{
    handle_completions, handle_config_init, handle_lookup, handle_normalize, handle_prepare, Cli,
    Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lookup(args) => handle_lookup(args).await,
        Commands::Prepare(args) => handle_prepare(&args).map(|_| ()),
        Commands::Normalize(args) => {
            println!("{}", handle_normalize(&args));
            Ok(())
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
