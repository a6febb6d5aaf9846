//! Markdown documentation for resolved schemas.
//!
//! The output follows the layout of registry documentation: a title, the
//! schema description, then `Required`, `Optional` and `Read-Only` attribute
//! lists followed by one section per nested attribute. Attributes are listed
//! in name order, so rendering the same schema always gives the same text.

use crate::schema::{
    AttributeFlags, DataSourceSchema, NestedAttributes, NestingMode, ResolvedAttribute,
    ResolvedSchema, ResourceSchema,
};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Render the documentation page of a resource.
///
/// ```
/// use provider_superschema::docs::render_resource;
/// use provider_superschema::layer::ResourceLayer;
/// use provider_superschema::superschema::{Attribute, Schema};
///
/// let schema = Schema::new()
///     .with_attribute(
///         "name",
///         Attribute::string()
///             .with_common(ResourceLayer::new().required().with_description("The name.")),
///     )
///     .resolve_for_resource();
///
/// let page = render_resource("example_thing", &schema);
/// assert!(page.starts_with("# example_thing (Resource)"));
/// assert!(page.contains("- `name` (String) The name."));
/// ```
pub fn render_resource(name: &str, schema: &ResourceSchema) -> String {
    MarkdownDoc::new(name, "Resource", schema).to_string()
}

/// Render the documentation page of a data source.
pub fn render_data_source(name: &str, schema: &DataSourceSchema) -> String {
    MarkdownDoc::new(name, "Data Source", schema).to_string()
}

/// A documentation page, rendered through [`fmt::Display`].
#[derive(Debug, Clone, Copy)]
pub struct MarkdownDoc<'a, S> {
    name: &'a str,
    kind: &'a str,
    schema: &'a S,
}

impl<'a, S: ResolvedSchema> MarkdownDoc<'a, S> {
    /// Create a page titled `name (kind)`.
    pub fn new(name: &'a str, kind: &'a str, schema: &'a S) -> Self {
        Self { name, kind, schema }
    }
}

impl<S: ResolvedSchema> fmt::Display for MarkdownDoc<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} ({})", self.name, self.kind)?;

        let docs = self.schema.docs();
        if !docs.preferred().is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", docs.preferred())?;
        }
        if !docs.deprecation_message.is_empty() {
            writeln!(f)?;
            writeln!(f, "~> **Deprecated** {}", docs.deprecation_message)?;
        }

        writeln!(f)?;
        writeln!(f, "## Schema")?;

        let mut pending = VecDeque::new();
        write_groups(f, self.schema.attributes(), "", Heading::Section, &mut pending)?;

        while let Some((path, nested)) = pending.pop_front() {
            writeln!(f)?;
            writeln!(f, "<a id=\"{}\"></a>", anchor(&path))?;
            writeln!(f, "### Nested Schema for `{}`", path)?;
            write_groups(f, &nested.attributes, &path, Heading::Label, &mut pending)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Required,
    Optional,
    ReadOnly,
}

impl Group {
    const ALL: [Group; 3] = [Group::Required, Group::Optional, Group::ReadOnly];

    fn of(flags: &AttributeFlags) -> Self {
        if flags.required {
            Group::Required
        } else if flags.is_computed_only() {
            Group::ReadOnly
        } else {
            Group::Optional
        }
    }

    fn title(self) -> &'static str {
        match self {
            Group::Required => "Required",
            Group::Optional => "Optional",
            Group::ReadOnly => "Read-Only",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Heading {
    /// `### Required`
    Section,
    /// `Required:`
    Label,
}

fn write_groups<'a, A: ResolvedAttribute>(
    f: &mut fmt::Formatter<'_>,
    attributes: &'a BTreeMap<String, A>,
    prefix: &str,
    heading: Heading,
    pending: &mut VecDeque<(String, &'a NestedAttributes<A>)>,
) -> fmt::Result {
    for group in Group::ALL {
        let mut members = attributes
            .iter()
            .filter(|(_, attr)| Group::of(attr.flags()) == group)
            .peekable();
        if members.peek().is_none() {
            continue;
        }

        writeln!(f)?;
        match heading {
            Heading::Section => writeln!(f, "### {}", group.title())?,
            Heading::Label => writeln!(f, "{}:", group.title())?,
        }
        writeln!(f)?;

        for (name, attr) in members {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            writeln!(f, "{}", attribute_line(name, &path, attr))?;
            if let Some(nested) = attr.nested() {
                pending.push_back((path, nested));
            }
        }
    }
    Ok(())
}

fn attribute_line<A: ResolvedAttribute>(name: &str, path: &str, attr: &A) -> String {
    let mut labels = vec![type_label(attr)];
    if attr.flags().sensitive {
        labels.push("Sensitive".to_string());
    }
    if !attr.docs().deprecation_message.is_empty() {
        labels.push("Deprecated".to_string());
    }

    let mut line = format!("- `{}` ({})", name, labels.join(", "));
    let description = attr.docs().preferred();
    if !description.is_empty() {
        line.push(' ');
        line.push_str(description);
    }
    if attr.nested().is_some() {
        line.push_str(&format!(
            " (see [below for nested schema](#{}))",
            anchor(path)
        ));
    }
    line
}

fn type_label<A: ResolvedAttribute>(attr: &A) -> String {
    match attr.nested() {
        Some(nested) => match nested.nesting_mode {
            NestingMode::Single => "Attributes".to_string(),
            NestingMode::List => "Attributes List".to_string(),
            NestingMode::Set => "Attributes Set".to_string(),
            NestingMode::Map => "Attributes Map".to_string(),
        },
        None => attr.attr_type().to_string(),
    }
}

fn anchor(path: &str) -> String {
    format!("nestedatt--{}", path.replace('.', "--"))
}
