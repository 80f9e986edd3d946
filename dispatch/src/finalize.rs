//! Post-descent pipeline: transforms, default backfill and required checks.

use std::collections::BTreeMap;

use command_tree_core::{CommandDescriptor, CommandTree, OptionDescriptor, Value, ValueType};
use tracing::debug;

use crate::error::{ParseFailure, ParseFailureKind};
use crate::options::ResolvedOptions;
use crate::scan::{Supplied, SuppliedOptions};

/// Every declaration visible at the leaf, outermost scope first.
///
/// Globals come first, then each command on the path with its options
/// followed by its positional arguments.
fn declarations<'t>(
    tree: &'t CommandTree,
    chain: &[&'t CommandDescriptor],
) -> Vec<(&'t OptionDescriptor, bool)> {
    let mut declared: Vec<(&OptionDescriptor, bool)> =
        tree.global_options().values().map(|opt| (opt, false)).collect();
    for command in chain {
        declared.extend(command.options().values().map(|opt| (opt, false)));
        declared.extend(command.arguments().iter().map(|opt| (opt, true)));
    }
    declared
}

/// Turns explicitly supplied values into the resolved option set for a leaf.
pub(crate) fn finalize<'t>(
    tree: &'t CommandTree,
    chain: &[&'t CommandDescriptor],
    supplied: SuppliedOptions<'t>,
    path: &[String],
) -> Result<ResolvedOptions, ParseFailure> {
    let declared = declarations(tree, chain);

    // Nearest declaration of each name decides its default.
    let mut nearest: BTreeMap<&str, &OptionDescriptor> = BTreeMap::new();
    for (descriptor, _) in &declared {
        nearest.insert(descriptor.name.as_str(), descriptor);
    }

    let mut resolved = ResolvedOptions::new();
    for (name, descriptor) in &nearest {
        if supplied.contains(name) {
            continue;
        }
        if let Some(default) = &descriptor.flags.default {
            resolved.insert(*name, default.clone());
        }
    }

    for (name, entry) in supplied.into_entries() {
        let value = transform_supplied(&entry, path)?;
        debug!(option = %name, value = %value, "resolved supplied option");
        resolved.insert(name, value);
    }

    for (descriptor, positional) in &declared {
        if descriptor.flags.required && !resolved.contains(&descriptor.name) {
            let external = if *positional {
                descriptor.argument_name()
            } else {
                descriptor.canonical_name()
            };
            let noun = if *positional { "argument" } else { "option" };
            return Err(ParseFailure::new(
                ParseFailureKind::MissingRequiredOption,
                format!("missing required {noun} {external}"),
                path,
            )
            .with_option(external));
        }
    }

    Ok(resolved)
}

/// Applies the descriptor's transform exactly once per supplied value.
///
/// Counts are summed before transforming. Accumulated options collect every
/// transformed element; single-valued options transform each occurrence in
/// order and keep the last result.
fn transform_supplied(entry: &Supplied<'_>, path: &[String]) -> Result<Value, ParseFailure> {
    let descriptor = entry.descriptor;
    let apply = |raw: &str, value: Value| -> Result<Value, ParseFailure> {
        match &descriptor.flags.transform {
            None => Ok(value),
            Some(transform) => transform.apply(value).map_err(|reason| {
                ParseFailure::new(
                    ParseFailureKind::TransformError,
                    format!("invalid value '{raw}' for {}: {reason}", entry.external_name()),
                    path,
                )
                .with_option(entry.external_name())
            }),
        }
    };

    if descriptor.value_type == ValueType::Count && !descriptor.accumulates() {
        let total = entry
            .occurrences
            .iter()
            .filter_map(|occ| occ.value.as_i64())
            .try_fold(0i64, i64::checked_add)
            .ok_or_else(|| {
                ParseFailure::new(
                    ParseFailureKind::InvalidValue,
                    format!("invalid value for {}: count overflows", entry.external_name()),
                    path,
                )
                .with_option(entry.external_name())
            })?;
        return apply(&total.to_string(), Value::Integer(total));
    }

    let items = entry
        .occurrences
        .iter()
        .map(|occ| apply(&occ.raw, occ.value.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    if descriptor.accumulates() {
        return Ok(Value::List(items));
    }
    Ok(items.into_iter().last().unwrap_or(Value::List(Vec::new())))
}
