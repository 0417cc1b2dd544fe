use clap::Parser;
use pwm::cli::{commands, load_settings, Cli, Commands};

/// Exit status for errors that indicate a programming fault in the caller.
const EXIT_FATAL: i32 = 70;

fn main() {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself; here it only
    // decides how chatty logging is.
    let configured = load_settings(&cli).map(|s| s.verbose).unwrap_or(0);
    pwm::logging::init(cli.verbose.max(configured));

    let result = match cli.command {
        Commands::Info => commands::info::execute(&cli),
        Commands::List => commands::list::execute(&cli),
        Commands::Find { ref pattern } => commands::find::execute(&cli, pattern),
        Commands::Show { ref id, reveal } => commands::show::execute(&cli, id, reveal),
        Commands::Add {
            ref kind,
            ref fields,
        } => commands::add::execute(&cli, kind, fields),
        Commands::Set { ref id, ref fields } => commands::set::execute(&cli, id, fields),
        Commands::Encrypt { ref file } => commands::encrypt::execute(&cli, file),
        Commands::Decrypt { ref file } => commands::decrypt::execute(&cli, file),
        Commands::Version => commands::version::execute(),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        pwm::cli::output::error(&e.to_string());
        std::process::exit(if e.is_fatal() { EXIT_FATAL } else { 1 });
    }
}
