use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Load flat files into the target database
    Import {
        #[arg(long, help = "Job file path")]
        config: String,

        #[arg(
            long,
            help = "If specified, writes the JSON summary to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Dump tables into flat files
    Export {
        #[arg(long, help = "Job file path")]
        config: String,

        #[arg(
            long,
            help = "If specified, writes the JSON summary to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Replay the job's DDL file and stop
    Ddl {
        #[arg(long, help = "Job file path")]
        config: String,
    },
    /// Open one connection and list the visible tables
    TestConn {
        /// Connection url, e.g. mysql://user:pw@host:3306/db
        #[arg(long)]
        url: String,
    },
}
