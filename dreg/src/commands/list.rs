//! `dreg list`: repositories and tags, optionally with image sizes.

use std::io::{self, Write};

use clap::Args;
use comfy_table::Table;
use ociclient::Registry;
use tracing::debug;

use crate::error::Result;
use crate::output;

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Repositories to list
    #[arg(value_name = "REPOSITORY")]
    pub repositories: Vec<String>,

    /// Show image sizes (slow)
    #[arg(short, long)]
    pub sizes: bool,

    /// Show output as a table
    #[arg(long)]
    pub table: bool,
}

/// One tag of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub repository: String,
    pub tag: String,
    /// Total compressed layer size, when sizes were requested
    pub size: Option<u64>,
}

impl ListRow {
    fn size_text(&self) -> Option<String> {
        self.size
            .map(|size| format!("{} (compressed)", output::format_bytes(size)))
    }
}

/// Where rows go: straight to the writer, or into a table rendered at the end.
enum Layout {
    Plain,
    Table(Table),
}

struct Listing<'w, W: Write> {
    out: &'w mut W,
    layout: Layout,
}

impl<'w, W: Write> Listing<'w, W> {
    fn new(out: &'w mut W, args: &ListArgs) -> Self {
        let layout = if args.table {
            let headers: &[&str] = if args.sizes {
                &["REPOSITORY", "TAG", "SIZE"]
            } else {
                &["REPOSITORY", "TAG"]
            };
            Layout::Table(output::new_table(headers))
        } else {
            Layout::Plain
        };
        Self { out, layout }
    }

    fn push(&mut self, row: &ListRow) -> io::Result<()> {
        match &mut self.layout {
            Layout::Plain => match row.size_text() {
                Some(size) => writeln!(self.out, "{}:{}\t{}", row.repository, row.tag, size),
                None => writeln!(self.out, "{}:{}", row.repository, row.tag),
            },
            Layout::Table(table) => {
                let mut cells = vec![row.repository.clone(), row.tag.clone()];
                cells.extend(row.size_text());
                table.add_row(cells);
                Ok(())
            }
        }
    }

    fn finish(self) -> io::Result<()> {
        if let Layout::Table(table) = self.layout {
            writeln!(self.out, "{}", output::render_table(&table))?;
        }
        self.out.flush()
    }
}

pub async fn run<R, W>(registry: &R, args: &ListArgs, out: &mut W) -> Result<()>
where
    R: Registry + ?Sized,
    W: Write,
{
    let mut listing = Listing::new(out, args);
    let result = list_rows(registry, args, &mut listing).await;

    // Rows gathered before a failure are still shown
    listing.finish()?;
    result
}

async fn list_rows<R, W>(registry: &R, args: &ListArgs, listing: &mut Listing<'_, W>) -> Result<()>
where
    R: Registry + ?Sized,
    W: Write,
{
    let repositories = if args.repositories.is_empty() {
        let mut repositories = registry.list_repositories().await?;
        repositories.sort();
        repositories
    } else {
        args.repositories.clone()
    };

    for repository in &repositories {
        let mut tags = registry.list_tags(repository).await?.tags;
        tags.sort();
        debug!("{} has {} tag(s)", repository, tags.len());

        for tag in tags {
            let size = if args.sizes {
                let manifest = registry.get_manifest(repository, &tag).await?;
                Some(manifest.total_size())
            } else {
                None
            };

            listing.push(&ListRow {
                repository: repository.clone(),
                tag,
                size,
            })?;
        }
    }

    Ok(())
}
