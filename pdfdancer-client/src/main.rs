use std::path::PathBuf;

use tracing::info;

use pdfdancer_client::models::{DocumentSnapshot, ObjectType};
use pdfdancer_client::{ClientConfig, PdfDancer};

const USAGE: &str = "usage: pdfdancer <input.pdf> [output.pdf]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(input) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let output = args.next();

    let config = ClientConfig::load()?;
    info!(base_url = %config.resolved_base_url(), "Configuration loaded");

    let mut client = PdfDancer::open(input.as_path(), &config).await?;
    info!(session_id = %client.session_id(), "Session open");

    let document = client.get_or_fetch_document().await?;
    print_summary(&document);

    if let Some(output) = output {
        client.save(&output).await?;
        println!("Saved to {}", output.display());
    }

    Ok(())
}

fn print_summary(document: &DocumentSnapshot) {
    println!("Pages: {}", document.page_count);
    println!("Fonts: {}", document.fonts.len());

    for (index, page) in document.pages.iter().enumerate() {
        let mut counts: Vec<(ObjectType, usize)> = Vec::new();
        for element in &page.elements {
            match counts
                .iter_mut()
                .find(|(object_type, _)| *object_type == element.object_type())
            {
                Some((_, count)) => *count += 1,
                None => counts.push((element.object_type(), 1)),
            }
        }

        let size = page
            .page_ref
            .page_size
            .as_ref()
            .map(|size| match &size.name {
                Some(name) => name.clone(),
                None => format!("{}x{}", size.width, size.height),
            })
            .unwrap_or_else(|| "unknown size".to_string());
        let orientation = page
            .page_ref
            .orientation
            .as_ref()
            .map(|orientation| orientation.as_str().to_string())
            .unwrap_or_default();
        let breakdown: Vec<String> = counts
            .iter()
            .map(|(object_type, count)| format!("{} {}", count, object_type))
            .collect();

        println!(
            "  Page {} ({} {}): {}",
            index,
            size,
            orientation,
            breakdown.join(", ")
        );
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    // Use RUST_LOG if set, otherwise default to info level for the client
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdfdancer_client=info,pdfdancer=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
