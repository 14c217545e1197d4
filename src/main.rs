use clap::Parser;
use miette::Result;

use aegis::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => aegis::cli::commands::init::run(args),
        Commands::Risk(cmd) => aegis::cli::commands::risk::run(cmd, &global),
        Commands::Ctrl(cmd) => aegis::cli::commands::ctrl::run(cmd, &global),
        Commands::Incident(cmd) => aegis::cli::commands::incident::run(cmd, &global),
        Commands::Policy(cmd) => aegis::cli::commands::policy::run(cmd, &global),
        Commands::Poam(cmd) => aegis::cli::commands::poam::run(cmd, &global),
        Commands::Search(args) => aegis::cli::commands::search::run(args, &global),
        Commands::Status(args) => aegis::cli::commands::status::run(args, &global),
        Commands::Report(cmd) => aegis::cli::commands::report::run(cmd, &global),
        Commands::Validate(args) => aegis::cli::commands::validate::run(args, &global),
        Commands::Completions(args) => aegis::cli::commands::completions::run(args),
    }
}
