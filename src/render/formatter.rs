//! Metadata Formatter - Renders orb metadata for humans and machines
//!
//! Text rendering is line-oriented and deterministic: element maps are
//! name-ordered, and default values are only shown where they are small
//! and unambiguous. JSON mode serializes the listing snapshot verbatim
//! and bypasses the textual paths entirely.

use std::collections::BTreeMap;

use crate::core::config::OutputOptions;
use crate::core::traits::{OrbElement, OrbElementParameter, OrbWithData, OrbsForListing};

/// Formatter for orb metadata
pub struct MetadataFormatter;

impl MetadataFormatter {
    /// One-line form: `<name> (<highestVersion>)`.
    pub fn orb_to_simple_string(orb: &OrbWithData) -> String {
        format!("{} ({})\n", orb.name, orb.highest_version)
    }

    /// Simple form followed by the Commands/Jobs/Executors sections.
    pub fn orb_to_detailed_string(orb: &OrbWithData) -> String {
        let mut buffer = Self::orb_to_simple_string(orb);

        Self::push_elements(&mut buffer, "Commands", &orb.commands);
        Self::push_elements(&mut buffer, "Jobs", &orb.jobs);
        Self::push_elements(&mut buffer, "Executors", &orb.executors);

        buffer
    }

    /// Append one section; empty sections render nothing at all.
    fn push_elements(
        buffer: &mut String,
        heading: &str,
        elements: &BTreeMap<String, OrbElement>,
    ) {
        if elements.is_empty() {
            return;
        }

        buffer.push_str(&format!("  {heading}:\n"));

        for (element_name, element) in elements {
            let parameter_count = element.parameters.len();
            buffer.push_str(&format!(
                "    - {element_name}: {parameter_count} parameter(s)\n"
            ));

            for (parameter_name, parameter) in &element.parameters {
                buffer.push_str(&format!(
                    "       - {}: {}{}\n",
                    parameter_name,
                    parameter.parameter_type,
                    Self::parameter_default_to_string(parameter)
                ));
            }
        }
    }

    /// Default-value suffix for one parameter line.
    ///
    /// Step lists can be arbitrarily large and would flood the output, so
    /// `steps` defaults are never rendered. Types outside the known set
    /// render no suffix either, even with a default present.
    fn parameter_default_to_string(parameter: &OrbElementParameter) -> String {
        let Some(default) = &parameter.default else {
            return String::new();
        };

        if parameter.parameter_type == "steps" {
            return String::new();
        }

        let value = match parameter.parameter_type.as_str() {
            "enum" | "string" => default.as_str().unwrap_or_default().to_string(),
            "boolean" => match default.as_bool() {
                Some(flag) => flag.to_string(),
                None => String::new(),
            },
            _ => return String::new(),
        };

        format!(" (default: '{value}')")
    }

    /// Render a listing snapshot per the invocation's output options.
    ///
    /// JSON mode serializes the snapshot with 2-space indentation and no
    /// additional computed fields.
    pub fn orb_collection_to_string(
        collection: &OrbsForListing,
        options: OutputOptions,
    ) -> Result<String, serde_json::Error> {
        if options.json {
            return serde_json::to_string_pretty(collection);
        }

        let mut result = format!("Orbs found: {}. ", collection.orbs.len());
        if options.uncertified {
            result.push_str("Includes all certified and uncertified orbs.\n\n");
        } else {
            result.push_str("Showing only certified orbs. Add -u for a list of all orbs.\n\n");
        }

        for orb in &collection.orbs {
            if options.details {
                result.push_str(&Self::orb_to_detailed_string(orb));
            } else {
                result.push_str(&Self::orb_to_simple_string(orb));
            }
        }

        Ok(result)
    }

    /// Render the info view of a single orb.
    pub fn orb_to_info_string(orb: &OrbWithData) -> String {
        let mut buffer = String::from("\n");

        // Newest first: versions[0] is the latest publish, the final entry
        // is the first release.
        if let (Some(newest), Some(oldest)) = (orb.versions.first(), orb.versions.last()) {
            buffer.push_str(&format!("Latest: {}@{}\n", orb.name, orb.highest_version));
            buffer.push_str(&format!(
                "Last-updated: {}\n",
                newest.created_at.to_rfc3339()
            ));
            buffer.push_str(&format!("Created: {}\n", orb.created_at.to_rfc3339()));
            buffer.push_str(&format!(
                "First-release: {} @ {}\n",
                oldest.version,
                oldest.created_at.to_rfc3339()
            ));
            buffer.push_str(&format!("Total-revisions: {}\n", orb.versions.len()));
        } else {
            buffer.push_str("This orb hasn't published any versions yet.\n");
        }

        buffer.push('\n');
        buffer.push_str(&format!("Total-commands: {}\n", orb.commands.len()));
        buffer.push_str(&format!("Total-executors: {}\n", orb.executors.len()));
        buffer.push_str(&format!("Total-jobs: {}\n", orb.jobs.len()));

        buffer
    }
}
