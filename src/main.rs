use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::io::{self, Write};
use std::path::Path;

use heonlog::category::CategoryTree;
use heonlog::config::Config;
use heonlog::loader::{Listing, Loader};
use heonlog::post::PostIndex;
use heonlog::selection::{Action, Selection};
use heonlog::source::{FsSource, HttpSource, Source};
use heonlog::write::Writer;

fn main() -> Result<()> {
    let matches = app().get_matches();

    init_logging(matches.occurrences_of("verbose"));

    let threads = match matches.value_of("threads") {
        Some(t) => Some(
            t.parse::<usize>()
                .with_context(|| format!("invalid thread count `{}`", t))?,
        ),
        None => None,
    };
    let config = match matches.value_of("project") {
        Some(dir) => Config::from_directory(Path::new(dir), threads)?,
        None => Config::from_directory(&std::env::current_dir()?, threads)?,
    };

    match &config.site_url {
        Some(site_url) => {
            let source = HttpSource::new(site_url, config.timeout)
                .with_context(|| format!("building post URLs from `{}`", site_url))?;
            run(&config, &source, &matches)
        }
        None => run(&config, &FsSource::new(&config.posts_directory), &matches),
    }
}

fn app() -> App<'static, 'static> {
    App::new("heonlog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lists, filters and shows the posts of a markdown blog")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Logs more; repeat for more detail"),
        )
        .arg(
            Arg::with_name("project")
                .long("project")
                .takes_value(true)
                .global(true)
                .help("The project directory (defaults to searching upwards from the working directory)"),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .takes_value(true)
                .global(true)
                .help("The number of threads to load posts with"),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Prints the posts matching a selection")
                .arg(
                    Arg::with_name("category")
                        .long("category")
                        .short("c")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("subcategory")
                        .long("subcategory")
                        .short("s")
                        .takes_value(true)
                        .requires("category"),
                )
                .arg(
                    Arg::with_name("tag")
                        .long("tag")
                        .short("t")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Selects a tag; posts matching any selected tag are listed"),
                )
                .arg(template_arg()),
        )
        .subcommand(SubCommand::with_name("tags").about("Prints every tag, in first-seen order"))
        .subcommand(SubCommand::with_name("categories").about("Prints the category tree"))
        .subcommand(
            SubCommand::with_name("show")
                .about("Prints a single post")
                .arg(Arg::with_name("post_id").required(true).index(1))
                .arg(template_arg()),
        )
}

fn template_arg() -> Arg<'static, 'static> {
    Arg::with_name("template")
        .long("template")
        .takes_value(true)
        .help("A gtmpl template to render with instead of the built-in one")
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run<S: Source>(config: &Config, source: &S, matches: &ArgMatches) -> Result<()> {
    let index = PostIndex::from_file(&config.post_index)?;
    let categories = CategoryTree::from_file(&config.category_tree)?;
    let loader = Loader::new(source, &categories, config.category_policy, config.threads);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match matches.subcommand() {
        ("list", Some(m)) => {
            let listing = load_listing(&loader, &index);
            let selection = Selection::from_actions(&actions(m), &categories);
            let writer = Writer::new(m.value_of("template").map(Path::new), None)?;
            writer.write_listing(
                &mut out,
                &selection.filter(listing.posts()),
                listing.tags(),
                &selection,
                &categories,
            )?;
        }
        ("tags", Some(_)) => {
            for tag in load_listing(&loader, &index).tags() {
                writeln!(out, "{}", tag)?;
            }
        }
        ("categories", Some(_)) => {
            for category in categories.iter() {
                writeln!(out, "{} ({})", category.key, category.name)?;
                for subcategory in &category.subcategories {
                    writeln!(out, "    {} ({})", subcategory.key, subcategory.name)?;
                }
            }
        }
        ("show", Some(m)) => {
            let id = m
                .value_of("post_id")
                .ok_or_else(|| anyhow!("missing post id"))?;
            let post = loader
                .load_by_id(&index, id)
                .with_context(|| format!("loading post `{}`", id))?;
            let writer = Writer::new(None, m.value_of("template").map(Path::new))?;
            writer.write_post(&mut out, &post)?;
        }
        (name, _) => return Err(anyhow!("unknown subcommand `{}`", name)),
    }
    out.flush()?;
    Ok(())
}

fn load_listing<S: Source>(loader: &Loader<S>, index: &PostIndex) -> Listing {
    let mut listing = Listing::new();
    let generation = listing.begin();
    listing.commit(generation, loader.load_all(index));
    listing
}

// Toggles are applied category first, then subcategory, then tags in the
// order given.
fn actions(m: &ArgMatches) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(category) = m.value_of("category") {
        actions.push(Action::ToggleCategory(category.to_owned()));
    }
    if let Some(subcategory) = m.value_of("subcategory") {
        actions.push(Action::ToggleSubcategory(subcategory.to_owned()));
    }
    if let Some(tags) = m.values_of("tag") {
        actions.extend(tags.map(|t| Action::ToggleTag(t.to_owned())));
    }
    actions
}
