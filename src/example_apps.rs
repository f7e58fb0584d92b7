use std::error::Error;
use std::sync::Arc;

use clap::{Parser, error::ErrorKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SplitConfig;
use crate::constants::domains::{SOURCE_DOMAIN, TARGET_DOMAIN};
use crate::data::{DomainDatasets, InMemoryDataset, LabeledDataset, Role, RoleDatasets};
use crate::errors::ConfigError;
use crate::partition::ClassDisjointPartitioner;
use crate::splits::SplitSchemeManager;
use crate::types::ClassId;

#[derive(Debug, Parser)]
#[command(
    name = "split_scheme_demo",
    disable_help_subcommand = true,
    about = "Build and verify class-disjoint split schemes",
    long_about = "Build split schemes over two synthetic domains, verify cross-scheme consistency, and print per-split sizes or the full manifest.",
    after_help = "Each domain holds contiguous class blocks in a seeded random class order; the test window is taken from the target domain."
)]
struct SplitSchemeDemoCli {
    #[arg(
        long,
        default_value_t = 6,
        value_parser = parse_class_count,
        help = "Classes per synthetic domain"
    )]
    classes: usize,
    #[arg(
        long = "samples-per-class",
        default_value_t = 10,
        value_parser = parse_positive_usize,
        help = "Samples generated for every class"
    )]
    samples_per_class: usize,
    #[arg(
        long = "test-size",
        default_value_t = 10,
        value_parser = parse_positive_usize,
        help = "Number of target samples in the test window"
    )]
    test_size: usize,
    #[arg(
        long = "test-start-idx",
        default_value_t = 0,
        help = "Target position of the first test sample"
    )]
    test_start_idx: usize,
    #[arg(
        long,
        default_value_t = 2,
        value_parser = parse_positive_usize,
        help = "Number of disjoint training partitions"
    )]
    partitions: usize,
    #[arg(
        long = "training-sets",
        default_value_t = 2,
        value_parser = parse_positive_usize,
        help = "Number of split schemes to build"
    )]
    training_sets: usize,
    #[arg(long, default_value_t = 7, help = "Seed for the synthetic class order")]
    seed: u64,
    #[arg(long, help = "Print the scheme manifest as JSON instead of a summary")]
    json: bool,
}

const SYNTHETIC_DOMAINS: [(&str, &str); 2] =
    [(SOURCE_DOMAIN, "synthetic_a"), (TARGET_DOMAIN, "synthetic_b")];

/// Largest `--classes` value whose class ids fit in `ClassId` across both domains.
const MAX_SYNTHETIC_CLASSES: usize = (ClassId::MAX / SYNTHETIC_DOMAINS.len() as ClassId) as usize;

/// Two domains with disjoint class ids, laid out as contiguous class blocks.
///
/// Block order is a seeded shuffle of each domain's classes. Both roles share
/// the same base datasets. Fails if the class ids of both domains do not fit
/// in `ClassId`.
pub fn synthetic_role_datasets(
    classes: usize,
    samples_per_class: usize,
    seed: u64,
) -> Result<RoleDatasets, ConfigError> {
    let count = ClassId::try_from(classes)
        .ok()
        .filter(|count| {
            count
                .checked_mul(SYNTHETIC_DOMAINS.len() as ClassId)
                .is_some()
        })
        .ok_or_else(|| ConfigError::InvalidParameter {
            name: "classes",
            reason: format!("{classes} classes per domain exceed the class id range"),
        })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut domains = DomainDatasets::new();
    for (offset, (domain, name)) in (0..).zip(SYNTHETIC_DOMAINS) {
        let first: ClassId = offset * count;
        let mut order: Vec<ClassId> = (first..first + count).collect();
        order.shuffle(&mut rng);
        let labels: Vec<ClassId> = order
            .iter()
            .flat_map(|&class| std::iter::repeat_n(class, samples_per_class))
            .collect();
        let dataset: Arc<dyn LabeledDataset> =
            Arc::new(InMemoryDataset::from_classes(name, &labels));
        domains.insert(domain.to_string(), dataset);
    }
    let mut datasets = RoleDatasets::new();
    datasets.insert(Role::Train, domains.clone());
    datasets.insert(Role::Eval, domains);
    Ok(datasets)
}

/// Parse demo arguments, build the schemes, and print a summary or manifest.
pub fn run_split_scheme_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<SplitSchemeDemoCli, _>(
        std::iter::once("split_scheme_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let datasets = synthetic_role_datasets(cli.classes, cli.samples_per_class, cli.seed)?;
    let config = SplitConfig {
        train_transform: Some("augment".to_string()),
        eval_transform: Some("deterministic".to_string()),
        test_size: cli.test_size,
        test_start_idx: cli.test_start_idx,
        num_training_partitions: cli.partitions,
        num_training_sets: cli.training_sets,
        hierarchy_level: 0,
    };
    let mut manager =
        SplitSchemeManager::new(&datasets, config, &ClassDisjointPartitioner::default())?;

    if cli.json {
        println!("{}", manager.manifest()?.to_json()?);
        return Ok(());
    }

    println!(
        "Built {} split schemes; all consistency checks passed.",
        manager.scheme_names().len()
    );
    for summary in manager.summary()? {
        println!(
            "{} / {} / {}: {} samples from '{}', {} classes, fingerprint {:016x}",
            summary.scheme,
            summary.role,
            summary.split,
            summary.len,
            summary.domain,
            summary.classes,
            summary.fingerprint
        );
    }

    // Walk the schemes the way a training loop would, logging each eval group.
    for name in manager.scheme_names().to_vec() {
        manager.select_scheme(&name)?;
        let group = manager.get_dataset_group(Role::Eval, None, None)?;
        println!("{name}: {} eval splits", group.len());
    }
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse value '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_class_count(raw: &str) -> Result<usize, String> {
    let parsed = parse_positive_usize(raw)?;
    if parsed > MAX_SYNTHETIC_CLASSES {
        return Err(format!(
            "value must be at most {MAX_SYNTHETIC_CLASSES} so class ids fit in {} bits",
            ClassId::BITS
        ));
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
