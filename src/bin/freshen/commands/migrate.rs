//! `freshen migrate` command

use anyhow::{bail, Context, Result};

use crate::cli::MigrateArgs;
use freshen::migration::PresetRenames;
use freshen::ops::{changed_options, migrate, MigrateOptions};
use freshen::util::diagnostic::{emit, suggestions, Diagnostic};
use freshen::util::GlobalContext;

pub fn execute(args: MigrateArgs, verbose: bool, color: bool) -> Result<()> {
    let mut ctx = GlobalContext::new().context("failed to create global context")?;
    ctx.set_verbose(verbose);
    ctx.set_color(color);

    let options = MigrateOptions {
        path: args.path,
        parent: args.parent,
        write: args.write,
        preset_renames: parse_preset_renames(&args.preset_renames)?,
    };

    let outcome = migrate(&ctx, &options)?;
    let path = outcome.file.path.display();

    if args.check {
        if outcome.result.is_migrated {
            let mut diag = Diagnostic::error("configuration needs migration").with_location(
                outcome.file.path.clone(),
            );
            for option in changed_options(&outcome.file.document, &outcome.result.migrated_config)
            {
                diag = diag.with_context(format!("`{}` changes", option));
            }
            emit(&diag, ctx.color());
            eprintln!("{}", suggestions::NEEDS_MIGRATION);
            std::process::exit(1);
        }
        println!("{} is up to date", path);
    } else if args.write {
        if outcome.written {
            println!("Migrated {}", path);
        } else {
            println!("{} is up to date", path);
        }
    } else {
        print!("{}", outcome.rendered);
    }

    Ok(())
}

/// Parse `FROM=TO` pairs.
fn parse_preset_renames(pairs: &[String]) -> Result<PresetRenames> {
    let mut renames = PresetRenames::new();
    for pair in pairs {
        let Some((from, to)) = pair.split_once('=') else {
            bail!("invalid preset rename `{}` (expected FROM=TO)", pair);
        };
        if from.is_empty() {
            bail!("invalid preset rename `{}` (empty FROM)", pair);
        }
        renames.insert(from, to);
    }
    Ok(renames)
}
