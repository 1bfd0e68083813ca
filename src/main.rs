use clap::Parser;
use miette::Result;
use usuppli::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
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
    usuppli::core::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => usuppli::cli::commands::init::run(args),
        Commands::Cost(args) => usuppli::cli::commands::cost::run(args, &global),
        Commands::Duty(args) => usuppli::cli::commands::duty::run(args, &global),
        Commands::Tariff(cmd) => usuppli::cli::commands::tariff::run(cmd, &global),
        Commands::Completions(args) => usuppli::cli::commands::completions::run(args),
    }
}
