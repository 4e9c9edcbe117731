use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{SearchFilters, SearchRequest};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "job-scout",
    version,
    about = "Aggregate job postings from LinkedIn, DOU, Djinni and Work.ua"
)]
pub struct Cli {
    /// Configuration file; defaults to config/{default,$RUN_MODE,local} when omitted
    #[arg(long, short = 'c', env = "JOB_SCOUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP API (default when no subcommand is given)
    Serve {
        /// Overrides server.host
        #[arg(long)]
        host: Option<String>,
        /// Overrides server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one search and print the response as JSON
    Search {
        query: String,
        /// Platform id, repeatable; all platforms when omitted
        #[arg(long = "platform", short = 'p')]
        platforms: Vec<String>,
        /// Post-filter keyword, repeatable
        #[arg(long = "keyword", short = 'k')]
        keywords: Vec<String>,
        #[arg(long, short = 'l')]
        location: Option<String>,
        /// Keep only postings that mention remote work
        #[arg(long)]
        remote: bool,
    },
}

impl Cli {
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve { host: None, port: None })
    }
}

impl Command {
    /// Search request for the `search` subcommand.
    pub fn search_request(&self) -> Option<SearchRequest> {
        let Command::Search {
            query,
            platforms,
            keywords,
            location,
            remote,
        } = self
        else {
            return None;
        };

        let mut request = SearchRequest::new(query.clone());
        if !platforms.is_empty() {
            request = request.with_platforms(platforms.iter().cloned());
        }

        let filters = SearchFilters {
            keywords: (!keywords.is_empty()).then(|| keywords.clone()),
            location: location.clone(),
            remote: remote.then_some(true),
            ..Default::default()
        };
        if filters != SearchFilters::default() {
            request = request.with_filters(filters);
        }

        Some(request)
    }
}
