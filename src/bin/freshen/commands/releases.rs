//! `freshen releases` command

use anyhow::{Context, Result};

use crate::cli::ReleasesArgs;
use freshen::datasource::{DatasourceRegistry, ExternalHostError, RegistryStrategy, Versioning};
use freshen::ops::{format_releases, lookup_releases, ReleasesOptions};
use freshen::util::diagnostic::{emit, Diagnostic};
use freshen::util::GlobalContext;

pub fn execute(args: ReleasesArgs, verbose: bool, color: bool) -> Result<()> {
    let strategy: Option<RegistryStrategy> = args
        .strategy
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("invalid --strategy")?;
    let versioning: Option<Versioning> = args
        .versioning
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("invalid --versioning")?;

    let mut ctx = GlobalContext::new().context("failed to create global context")?;
    ctx.set_verbose(verbose);
    ctx.set_color(color);

    let offline = args.offline || ctx.config().net.offline;
    let registry = DatasourceRegistry::with_defaults(offline);

    let options = ReleasesOptions {
        datasource: args.datasource,
        dep_name: args.dep_name,
        registry_urls: args.registry_urls,
        strategy,
        extract_version: args.extract_version,
        versioning,
    };

    let found = match lookup_releases(&ctx, &registry, &options) {
        Ok(found) => found,
        Err(err) => {
            let Some(host) = err.downcast_ref::<ExternalHostError>() else {
                return Err(err);
            };
            let mut diag = host.to_diagnostic();
            if ctx.is_verbose() {
                diag = diag.with_context(format!("{:#}", err));
            }
            emit(&diag, ctx.color());
            std::process::exit(1);
        }
    };
    let Some(result) = found else {
        let diag = Diagnostic::note(format!("no releases found for `{}`", options.dep_name));
        emit(&diag, ctx.color());
        std::process::exit(1);
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize releases")?;
        println!("{}", json);
    } else {
        print!("{}", format_releases(&result));
    }

    Ok(())
}
