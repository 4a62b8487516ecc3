use clap::Parser;
use securestore::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create => commands::create::execute(&cli),
        Commands::Set { ref key, ref value } => {
            commands::set::execute(&cli, key, value.as_deref())
        }
        Commands::Get {
            ref key,
            all,
            output_format,
        } => commands::get::execute(&cli, key.as_deref(), all, output_format),
        Commands::Delete { ref key } => commands::delete::execute(&cli, key),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
