use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use inkpost::editor::{ensure_default_blog, spawn_session, DashboardClient, EditingSession, FieldEdit};
use inkpost::model::blog::NewBlog;
use inkpost::text_utils::generate_slug;

use crate::config_data::write_sample_cfg;

mod config_data;

const TOKEN_ENV: &str = "INKPOST_TOKEN";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes a sample inkpost.toml
    SampleConfig {
        /// Output file. Stdout when missing
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Invalidates cached public pages of a running server
    Revalidate(RevalidateArgs),
    /// Makes sure the account has a blog, creating the default one if needed
    EnsureBlog(EnsureBlogArgs),
    /// Edits a post through the dashboard API
    Edit(EditArgs),
    /// Prints the slug generated from a title
    Slug {
        title: String,
    },
}

#[derive(Parser, Debug)]
struct ServerArgs {
    /// Server base url
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    url: String,

    /// Access token. Falls back to INKPOST_TOKEN
    #[arg(long)]
    token: Option<String>,
}

impl ServerArgs {
    fn client(&self) -> Result<DashboardClient> {
        let token = match self.token.clone().or_else(|| std::env::var(TOKEN_ENV).ok()) {
            Some(token) => token,
            None => bail!("No access token. Use --token or {}", TOKEN_ENV),
        };
        Ok(DashboardClient::new(&self.url, &token, Duration::from_secs(10))?)
    }
}

#[derive(Parser, Debug)]
struct RevalidateArgs {
    /// Server base url
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    url: String,

    /// Revalidation secret
    #[arg(short, long)]
    secret: String,

    /// Cache tag, repeatable
    #[arg(short, long)]
    tag: Vec<String>,

    /// Path, repeatable
    #[arg(short, long)]
    path: Vec<String>,
}

#[derive(Parser, Debug)]
struct EnsureBlogArgs {
    #[command(flatten)]
    server: ServerArgs,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Parser, Debug)]
struct EditArgs {
    #[command(flatten)]
    server: ServerArgs,

    /// Post id
    #[arg(long)]
    id: String,

    /// Blog slug, used for the revalidated paths
    #[arg(long)]
    blog: String,

    #[arg(long)]
    title: Option<String>,

    /// Slug. With --slug-from-title the slug is generated from the title instead
    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    slug_from_title: bool,

    #[arg(long)]
    excerpt: Option<String>,

    /// File with the document tree as JSON
    #[arg(long)]
    content: Option<PathBuf>,

    /// Waits for the autosave instead of saving explicitly
    #[arg(long)]
    autosave: bool,

    #[arg(long, conflicts_with = "unpublish")]
    publish: bool,

    #[arg(long)]
    unpublish: bool,
}

async fn revalidate_cmd(args: RevalidateArgs) -> Result<()> {
    let url = format!("{}/api/revalidate", args.url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .header("x-revalidate-token", &args.secret)
        .json(&json!({ "tags": args.tag, "paths": args.path }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        bail!("Revalidation failed ({}): {}", status, body["error"].as_str().unwrap_or("unknown error"));
    }
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn ensure_blog_cmd(args: EnsureBlogArgs) -> Result<()> {
    let client = args.server.client()?;
    let defaults = NewBlog {
        name: args.name,
        slug: args.slug,
        description: args.description,
    };
    let blog = ensure_default_blog(&client, &defaults).await?;
    println!("Blog {} ({})", blog.attributes.slug, blog.id);
    Ok(())
}

fn field_edits(args: &EditArgs) -> Result<Vec<FieldEdit>> {
    let mut edits = vec![];
    if let Some(ref title) = args.title {
        edits.push(FieldEdit::Title(title.clone()));
    }

    let slug = match (args.slug_from_title, &args.title, &args.slug) {
        (true, Some(title), _) => Some(generate_slug(title)),
        (true, None, _) => bail!("--slug-from-title needs --title"),
        (false, _, slug) => slug.clone(),
    };
    if let Some(slug) = slug {
        edits.push(FieldEdit::Slug(slug));
    }

    if let Some(ref excerpt) = args.excerpt {
        edits.push(FieldEdit::Excerpt(excerpt.clone()));
    }
    if let Some(ref path) = args.content {
        let src = std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        let doc: Value = serde_json::from_str(&src).with_context(|| format!("Parsing {}", path.display()))?;
        edits.push(FieldEdit::Content(doc));
    }
    Ok(edits)
}

async fn edit_cmd(args: EditArgs) -> Result<()> {
    let edits = field_edits(&args)?;
    let client = args.server.client()?;
    let delay = Duration::from_millis(1000);

    let session = EditingSession::open(client, &args.id, &args.blog, delay).await?;
    let handle = spawn_session(session);

    for edit in edits {
        handle.edit(edit).await?;
    }

    if handle.status().await?.dirty {
        if args.autosave {
            tokio::time::sleep(delay + Duration::from_millis(200)).await;
        } else {
            handle.save().await?;
        }
    }

    if args.publish {
        handle.publish().await?;
    } else if args.unpublish {
        handle.unpublish().await?;
    }

    let status = handle.status().await?;
    handle.close().await;

    if status.dirty {
        return Err(anyhow!("Post {} still has unsaved changes", args.id));
    }
    println!("Post {} is {}{}", args.id, status.status,
             status.last_saved.map(|t| format!(", saved at {}", t.to_rfc3339())).unwrap_or_default());
    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::SampleConfig { out } => write_sample_cfg(out.as_deref())?,
        Command::Revalidate(args) => revalidate_cmd(args).await?,
        Command::EnsureBlog(args) => ensure_blog_cmd(args).await?,
        Command::Edit(args) => edit_cmd(args).await?,
        Command::Slug { title } => println!("{}", generate_slug(&title)),
    }
    Ok(())
}
