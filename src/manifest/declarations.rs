//! Declaration records.

use serde::{Deserialize, Serialize};

use super::items::{
    Attribute, CssProperty, Event, Member, NamedItem, Parameter, ReturnInfo, TypeInfo,
};
use super::{DeclarationId, Reference};

/// Identity of a declaration that is ignored by structural equality.
///
/// Two manifests built from the same sources compare equal even though their
/// declarations were allocated different ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity(DeclarationId);

impl PartialEq for Identity {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Identity {
    pub fn get(&self) -> DeclarationId {
        self.0
    }
}

/// Discriminant of [`Declaration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Function,
    Variable,
    Mixin,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Function => "function",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Mixin => "mixin",
        }
    }

    /// Classes and mixins both carry members and element collections.
    pub fn is_class_like(&self) -> bool {
        matches!(self, DeclarationKind::Class | DeclarationKind::Mixin)
    }
}

/// A module-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Declaration {
    Class(ClassDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
    Mixin(ClassDeclaration),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(c) | Declaration::Mixin(c) => &c.name,
            Declaration::Function(f) => &f.name,
            Declaration::Variable(v) => &v.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Declaration::Class(c) | Declaration::Mixin(c) => c.name = name,
            Declaration::Function(f) => f.name = name,
            Declaration::Variable(v) => v.name = name,
        }
    }

    pub fn id(&self) -> DeclarationId {
        match self {
            Declaration::Class(c) | Declaration::Mixin(c) => c.id.get(),
            Declaration::Function(f) => f.id.get(),
            Declaration::Variable(v) => v.id.get(),
        }
    }

    /// Give this declaration a new identity (used when copying between documents).
    pub fn refresh_id(&mut self) {
        let id = Identity::default();
        match self {
            Declaration::Class(c) | Declaration::Mixin(c) => c.id = id,
            Declaration::Function(f) => f.id = id,
            Declaration::Variable(v) => v.id = id,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Class(_) => DeclarationKind::Class,
            Declaration::Function(_) => DeclarationKind::Function,
            Declaration::Variable(_) => DeclarationKind::Variable,
            Declaration::Mixin(_) => DeclarationKind::Mixin,
        }
    }

    pub fn as_class_like(&self) -> Option<&ClassDeclaration> {
        match self {
            Declaration::Class(c) | Declaration::Mixin(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_like_mut(&mut self) -> Option<&mut ClassDeclaration> {
        match self {
            Declaration::Class(c) | Declaration::Mixin(c) => Some(c),
            _ => None,
        }
    }

    /// Stringified default value, for declarations that have one.
    pub fn default_value(&self) -> Option<&str> {
        match self {
            Declaration::Variable(v) => v.default.as_deref(),
            _ => None,
        }
    }
}

/// A class or mixin declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    #[serde(skip)]
    pub id: Identity,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixins: Option<Vec<Reference>>,
    /// Mixin parameters (`(superClass) => class extends superClass {}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_element: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<NamedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_parts: Option<Vec<NamedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_properties: Option<Vec<CssProperty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_states: Option<Vec<NamedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<NamedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Vec<NamedItem>>,
}

impl ClassDeclaration {
    /// A fresh class with every collection present and empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mixins: Some(Vec::new()),
            members: Some(Vec::new()),
            attributes: Some(Vec::new()),
            events: Some(Vec::new()),
            slots: Some(Vec::new()),
            css_parts: Some(Vec::new()),
            css_properties: Some(Vec::new()),
            css_states: Some(Vec::new()),
            icons: Some(Vec::new()),
            locale: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn members(&self) -> &[Member] {
        self.members.as_deref().unwrap_or_default()
    }

    pub fn members_mut(&mut self) -> &mut Vec<Member> {
        self.members.get_or_insert_with(Vec::new)
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.attributes.as_deref().unwrap_or_default()
    }

    pub fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        self.attributes.get_or_insert_with(Vec::new)
    }

    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }

    pub fn events_mut(&mut self) -> &mut Vec<Event> {
        self.events.get_or_insert_with(Vec::new)
    }

    pub fn mixins(&self) -> &[Reference] {
        self.mixins.as_deref().unwrap_or_default()
    }

    /// Find a field by name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut super::Field> {
        self.members_mut().iter_mut().find_map(|m| match m {
            Member::Field(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    /// Find a member by name and static-ness.
    pub fn member(&self, name: &str, is_static: bool) -> Option<&Member> {
        self.members()
            .iter()
            .find(|m| m.name() == name && m.is_static() == is_static)
    }

    pub fn is_custom_element(&self) -> bool {
        self.custom_element.unwrap_or(false)
    }

    /// Every reference held by the class: heritage plus `inheritedFrom` stamps.
    pub fn references_mut(&mut self) -> Vec<&mut Reference> {
        let mut refs: Vec<&mut Reference> = Vec::new();
        refs.extend(self.superclass.as_mut());
        refs.extend(self.mixins.iter_mut().flatten());
        refs.extend(self.members.iter_mut().flatten().filter_map(|m| match m {
            Member::Field(f) => f.inherited_from.as_mut(),
            Member::Method(m) => m.inherited_from.as_mut(),
        }));
        refs.extend(
            self.attributes
                .iter_mut()
                .flatten()
                .filter_map(|a| a.inherited_from.as_mut()),
        );
        refs.extend(
            self.events
                .iter_mut()
                .flatten()
                .filter_map(|e| e.inherited_from.as_mut()),
        );
        refs.extend(
            self.css_properties
                .iter_mut()
                .flatten()
                .filter_map(|p| p.inherited_from.as_mut()),
        );
        for items in [
            &mut self.slots,
            &mut self.css_parts,
            &mut self.css_states,
            &mut self.icons,
            &mut self.locale,
        ] {
            refs.extend(items.iter_mut().flatten().filter_map(|i| i.inherited_from.as_mut()));
        }
        refs
    }
}

/// A module-level function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    #[serde(skip)]
    pub id: Identity,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_info: Option<ReturnInfo>,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A module-level variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    #[serde(skip)]
    pub id: Identity,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_info: Option<TypeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
