//! `quire menus` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_content::{ResolvedMenu, Site};
use quire_server::server_config_from_quire_config;
use quire_store::Menu;
use quire_store_sqlite::SqliteStore;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the menus command.
#[derive(Args)]
pub(crate) struct MenusArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config).
    #[arg(long, env = "QUIRE_DATABASE_URL")]
    database_url: Option<String>,
}

impl MenusArgs {
    /// Print root menus with their children.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            database_url: self.database_url,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(file) = &config.database_resolved.file
            && !file.exists()
        {
            output.warning(&format!("No database at {}", file.display()));
            return Ok(());
        }

        let server_config = server_config_from_quire_config(&config);
        let store = SqliteStore::connect(&server_config.database_url).await?;
        let site = Site::new(Arc::new(store), server_config.site);

        let mut tree = Vec::new();
        for root in site.root_menus().await? {
            let children = site.children(root.id).await?;
            tree.push((root, children));
        }
        if tree.is_empty() {
            output.info("No menus");
            return Ok(());
        }

        for line in format_tree(&tree) {
            if line.starts_with(' ') {
                output.info(&line);
            } else {
                output.highlight(&line);
            }
        }
        Ok(())
    }
}

fn entry(menu: &Menu, parent: Option<&Menu>) -> String {
    let resolved = ResolvedMenu {
        menu: menu.clone(),
        parent: parent.cloned(),
    };
    let mut line = format!("{} (/{})", menu.title, resolved.url_path());
    if let Some(redirect) = &menu.redirect_to {
        line.push_str(&format!(" -> {redirect}"));
    }
    if menu.disabled {
        line.push_str(" [disabled]");
    }
    line
}

/// One line per menu, children indented below their root.
fn format_tree(tree: &[(Menu, Vec<Menu>)]) -> Vec<String> {
    tree.iter()
        .flat_map(|(root, children)| {
            std::iter::once(entry(root, None)).chain(
                children
                    .iter()
                    .map(move |child| format!("  {}", entry(child, Some(root)))),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quire_store::MenuId;

    use super::*;

    fn menu(id: i64, title: &str, slug: &str, parent: Option<i64>) -> Menu {
        Menu {
            id: MenuId(id),
            title: title.to_owned(),
            url_slug: slug.to_owned(),
            disabled: false,
            parent_id: parent.map(MenuId),
            redirect_to: None,
            position: 0,
        }
    }

    #[test]
    fn test_format_tree() {
        let mut history = menu(3, "History", "history", Some(1));
        history.disabled = true;
        let mut shop = menu(4, "Shop", "shop", None);
        shop.redirect_to = Some("https://shop.example.com".to_owned());
        let tree = vec![
            (
                menu(1, "About", "about", None),
                vec![menu(2, "Team", "team", Some(1)), history],
            ),
            (shop, Vec::new()),
        ];

        assert_eq!(
            format_tree(&tree),
            vec![
                "About (/about)",
                "  Team (/about/team)",
                "  History (/about/history) [disabled]",
                "Shop (/shop) -> https://shop.example.com",
            ]
        );
    }
}
