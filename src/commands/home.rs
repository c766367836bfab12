use crate::config::cli::HomeArgs;
use crate::site::{route_for_page, HomePage};
use crate::utils::error::Result;
use std::path::Path;

pub async fn execute(args: HomeArgs) -> Result<()> {
    let mut page = HomePage::default();
    if let Some(title) = args.title {
        page.title = title;
    }
    let html = page.render();

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, html).await?;
            println!("📄 Home page written to {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}

pub fn route(page: &Path) -> Result<()> {
    println!("{}", route_for_page(page)?);
    Ok(())
}
