//! Closed set of semantic roles accepted by role queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::QueryModelError;

/// Accessible roles a role query may target.
///
/// Markup tag names (`p`, `div`, `h1`, ...) are deliberately absent; a role query always names
/// the semantic category an element exposes to assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    Alert,
    Alertdialog,
    Article,
    Banner,
    Button,
    Cell,
    Checkbox,
    Columnheader,
    Combobox,
    Complementary,
    Contentinfo,
    Dialog,
    Figure,
    Form,
    Grid,
    Gridcell,
    Group,
    Heading,
    Img,
    Link,
    List,
    Listbox,
    Listitem,
    Main,
    Menu,
    Menubar,
    Menuitem,
    Menuitemcheckbox,
    Menuitemradio,
    Navigation,
    Option,
    Progressbar,
    Radio,
    Radiogroup,
    Region,
    Row,
    Rowgroup,
    Rowheader,
    Search,
    Searchbox,
    Separator,
    Slider,
    Spinbutton,
    Status,
    Switch,
    Tab,
    Table,
    Tablist,
    Tabpanel,
    Textbox,
    Toolbar,
    Tooltip,
    Tree,
    Treeitem,
}

impl AriaRole {
    pub const ALL: [AriaRole; 54] = [
        AriaRole::Alert,
        AriaRole::Alertdialog,
        AriaRole::Article,
        AriaRole::Banner,
        AriaRole::Button,
        AriaRole::Cell,
        AriaRole::Checkbox,
        AriaRole::Columnheader,
        AriaRole::Combobox,
        AriaRole::Complementary,
        AriaRole::Contentinfo,
        AriaRole::Dialog,
        AriaRole::Figure,
        AriaRole::Form,
        AriaRole::Grid,
        AriaRole::Gridcell,
        AriaRole::Group,
        AriaRole::Heading,
        AriaRole::Img,
        AriaRole::Link,
        AriaRole::List,
        AriaRole::Listbox,
        AriaRole::Listitem,
        AriaRole::Main,
        AriaRole::Menu,
        AriaRole::Menubar,
        AriaRole::Menuitem,
        AriaRole::Menuitemcheckbox,
        AriaRole::Menuitemradio,
        AriaRole::Navigation,
        AriaRole::Option,
        AriaRole::Progressbar,
        AriaRole::Radio,
        AriaRole::Radiogroup,
        AriaRole::Region,
        AriaRole::Row,
        AriaRole::Rowgroup,
        AriaRole::Rowheader,
        AriaRole::Search,
        AriaRole::Searchbox,
        AriaRole::Separator,
        AriaRole::Slider,
        AriaRole::Spinbutton,
        AriaRole::Status,
        AriaRole::Switch,
        AriaRole::Tab,
        AriaRole::Table,
        AriaRole::Tablist,
        AriaRole::Tabpanel,
        AriaRole::Textbox,
        AriaRole::Toolbar,
        AriaRole::Tooltip,
        AriaRole::Tree,
        AriaRole::Treeitem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AriaRole::Alert => "alert",
            AriaRole::Alertdialog => "alertdialog",
            AriaRole::Article => "article",
            AriaRole::Banner => "banner",
            AriaRole::Button => "button",
            AriaRole::Cell => "cell",
            AriaRole::Checkbox => "checkbox",
            AriaRole::Columnheader => "columnheader",
            AriaRole::Combobox => "combobox",
            AriaRole::Complementary => "complementary",
            AriaRole::Contentinfo => "contentinfo",
            AriaRole::Dialog => "dialog",
            AriaRole::Figure => "figure",
            AriaRole::Form => "form",
            AriaRole::Grid => "grid",
            AriaRole::Gridcell => "gridcell",
            AriaRole::Group => "group",
            AriaRole::Heading => "heading",
            AriaRole::Img => "img",
            AriaRole::Link => "link",
            AriaRole::List => "list",
            AriaRole::Listbox => "listbox",
            AriaRole::Listitem => "listitem",
            AriaRole::Main => "main",
            AriaRole::Menu => "menu",
            AriaRole::Menubar => "menubar",
            AriaRole::Menuitem => "menuitem",
            AriaRole::Menuitemcheckbox => "menuitemcheckbox",
            AriaRole::Menuitemradio => "menuitemradio",
            AriaRole::Navigation => "navigation",
            AriaRole::Option => "option",
            AriaRole::Progressbar => "progressbar",
            AriaRole::Radio => "radio",
            AriaRole::Radiogroup => "radiogroup",
            AriaRole::Region => "region",
            AriaRole::Row => "row",
            AriaRole::Rowgroup => "rowgroup",
            AriaRole::Rowheader => "rowheader",
            AriaRole::Search => "search",
            AriaRole::Searchbox => "searchbox",
            AriaRole::Separator => "separator",
            AriaRole::Slider => "slider",
            AriaRole::Spinbutton => "spinbutton",
            AriaRole::Status => "status",
            AriaRole::Switch => "switch",
            AriaRole::Tab => "tab",
            AriaRole::Table => "table",
            AriaRole::Tablist => "tablist",
            AriaRole::Tabpanel => "tabpanel",
            AriaRole::Textbox => "textbox",
            AriaRole::Toolbar => "toolbar",
            AriaRole::Tooltip => "tooltip",
            AriaRole::Tree => "tree",
            AriaRole::Treeitem => "treeitem",
        }
    }

    /// Roles whose accessible name is computed from their descendants' text.
    pub fn names_from_content(&self) -> bool {
        matches!(
            self,
            AriaRole::Button
                | AriaRole::Cell
                | AriaRole::Checkbox
                | AriaRole::Columnheader
                | AriaRole::Gridcell
                | AriaRole::Heading
                | AriaRole::Link
                | AriaRole::Listitem
                | AriaRole::Menuitem
                | AriaRole::Menuitemcheckbox
                | AriaRole::Menuitemradio
                | AriaRole::Option
                | AriaRole::Radio
                | AriaRole::Row
                | AriaRole::Rowheader
                | AriaRole::Switch
                | AriaRole::Tab
                | AriaRole::Tooltip
                | AriaRole::Treeitem
        )
    }

    /// Comma separated role list, used verbatim in prompts.
    pub fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(AriaRole::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AriaRole {
    type Err = QueryModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| QueryModelError::UnknownRole(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_case_insensitively() {
        assert_eq!("heading".parse::<AriaRole>().unwrap(), AriaRole::Heading);
        assert_eq!(" Button ".parse::<AriaRole>().unwrap(), AriaRole::Button);
    }

    #[test]
    fn rejects_tag_names() {
        for tag in ["paragraph", "p", "div", "h1", "span", "input"] {
            assert_eq!(
                tag.parse::<AriaRole>(),
                Err(QueryModelError::UnknownRole(tag.to_string()))
            );
        }
    }

    #[test]
    fn vocabulary_lists_roles_only() {
        let vocabulary = AriaRole::vocabulary();
        assert!(vocabulary.starts_with("alert, alertdialog"));
        assert!(vocabulary.contains("heading"));
        assert!(!vocabulary.contains("paragraph"));
    }
}
