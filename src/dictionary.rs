//! Protocol dictionary: the read-only catalog of applications, commands,
//! vendors, AVPs, and types.
//!
//! Definitions are grouped into per-application scopes; lookups consult the
//! requested application's scope first and fall back to the base-protocol
//! scope (application 0). Name lookups are case-insensitive. The dictionary
//! is immutable once populated and safe to share across concurrent builds.

use std::collections::HashMap;

/// Diameter application (interface) definition.
#[derive(Debug, Clone)]
pub struct Application {
    pub id: u32,
    pub name: String,
}

/// Command definition.
#[derive(Debug, Clone)]
pub struct CommandDef {
    pub code: u32,
    pub name: String,
}

/// Vendor definition.
#[derive(Debug, Clone)]
pub struct VendorDef {
    pub code: u32,
    pub name: String,
}

/// Dictionary policy for an AVP flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvpPolicy {
    Must,
    #[default]
    May,
    ShouldNot,
    MustNot,
}

/// AVP definition: code, declared type, owning vendor, flag policies, and
/// enumerated values where the type is an enumeration.
#[derive(Debug, Clone)]
pub struct AvpDef {
    pub code: u32,
    pub name: String,
    pub type_name: Option<String>,
    pub vendor_id: Option<u32>,
    pub mandatory: AvpPolicy,
    pub protected: AvpPolicy,
    pub enums: Vec<(String, i64)>,
}

impl AvpDef {
    pub fn new(code: u32, name: impl Into<String>, type_name: Option<&str>) -> Self {
        AvpDef {
            code,
            name: name.into(),
            type_name: type_name.map(str::to_string),
            vendor_id: None,
            mandatory: AvpPolicy::default(),
            protected: AvpPolicy::default(),
            enums: Vec::new(),
        }
    }

    pub fn with_vendor(mut self, vendor_id: u32) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    pub fn with_mandatory(mut self, policy: AvpPolicy) -> Self {
        self.mandatory = policy;
        self
    }

    pub fn with_protected(mut self, policy: AvpPolicy) -> Self {
        self.protected = policy;
        self
    }

    pub fn with_enum(mut self, name: impl Into<String>, code: i64) -> Self {
        self.enums.push((name.into(), code));
        self
    }

    /// Enumeration code for a label, if declared.
    pub fn enum_code(&self, name: &str) -> Option<i64> {
        self.enums.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    /// Enumeration label for a code, if declared.
    pub fn enum_name(&self, code: i64) -> Option<&str> {
        self.enums
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(n, _)| n.as_str())
    }
}

/// Derived type definition; `parent` chains to the primitive base type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub parent: Option<String>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        TypeDef {
            name: name.into(),
            parent: parent.map(str::to_string),
        }
    }
}

/// Definitions registered for one application.
#[derive(Debug, Default)]
struct Scope {
    commands: Vec<CommandDef>,
    commands_by_code: HashMap<u32, usize>,
    commands_by_name: HashMap<String, usize>,
    vendors: Vec<VendorDef>,
    vendors_by_code: HashMap<u32, usize>,
    vendors_by_name: HashMap<String, usize>,
    avps: Vec<AvpDef>,
    avps_by_code: HashMap<(u32, u32), usize>,
    avps_by_name: HashMap<(u32, String), usize>,
    types: Vec<TypeDef>,
    types_by_name: HashMap<String, usize>,
}

/// The full protocol dictionary. Application 0 holds the base protocol.
#[derive(Debug, Default)]
pub struct Dictionary {
    applications: Vec<Application>,
    applications_by_id: HashMap<u32, usize>,
    applications_by_name: HashMap<String, usize>,
    scopes: HashMap<u32, Scope>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    pub fn add_application(&mut self, app: Application) {
        let i = self.applications.len();
        self.applications_by_id.insert(app.id, i);
        self.applications_by_name
            .insert(app.name.to_ascii_lowercase(), i);
        self.scopes.entry(app.id).or_default();
        self.applications.push(app);
    }

    pub fn add_command(&mut self, app_id: u32, def: CommandDef) {
        let scope = self.scopes.entry(app_id).or_default();
        let i = scope.commands.len();
        scope.commands_by_code.insert(def.code, i);
        scope
            .commands_by_name
            .insert(def.name.to_ascii_lowercase(), i);
        scope.commands.push(def);
    }

    pub fn add_vendor(&mut self, app_id: u32, def: VendorDef) {
        let scope = self.scopes.entry(app_id).or_default();
        let i = scope.vendors.len();
        scope.vendors_by_code.insert(def.code, i);
        scope
            .vendors_by_name
            .insert(def.name.to_ascii_lowercase(), i);
        scope.vendors.push(def);
    }

    pub fn add_avp(&mut self, app_id: u32, def: AvpDef) {
        let scope = self.scopes.entry(app_id).or_default();
        let vendor = def.vendor_id.unwrap_or(0);
        let i = scope.avps.len();
        scope.avps_by_code.insert((vendor, def.code), i);
        scope
            .avps_by_name
            .insert((vendor, def.name.to_ascii_lowercase()), i);
        scope.avps.push(def);
    }

    pub fn add_type(&mut self, app_id: u32, def: TypeDef) {
        let scope = self.scopes.entry(app_id).or_default();
        let i = scope.types.len();
        scope.types_by_name.insert(def.name.to_ascii_lowercase(), i);
        scope.types.push(def);
    }

    pub fn application_by_id(&self, id: u32) -> Option<&Application> {
        self.applications_by_id
            .get(&id)
            .map(|&i| &self.applications[i])
    }

    pub fn application_by_name(&self, name: &str) -> Option<&Application> {
        self.applications_by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.applications[i])
    }

    pub fn command_by_code(&self, app_id: u32, code: u32) -> Option<&CommandDef> {
        self.in_scopes(app_id, |s| {
            s.commands_by_code.get(&code).map(|&i| &s.commands[i])
        })
    }

    pub fn command_by_name(&self, app_id: u32, name: &str) -> Option<&CommandDef> {
        let key = name.to_ascii_lowercase();
        self.in_scopes(app_id, |s| {
            s.commands_by_name.get(&key).map(|&i| &s.commands[i])
        })
    }

    pub fn vendor_by_code(&self, app_id: u32, code: u32) -> Option<&VendorDef> {
        self.in_scopes(app_id, |s| {
            s.vendors_by_code.get(&code).map(|&i| &s.vendors[i])
        })
    }

    pub fn vendor_by_name(&self, app_id: u32, name: &str) -> Option<&VendorDef> {
        let key = name.to_ascii_lowercase();
        self.in_scopes(app_id, |s| {
            s.vendors_by_name.get(&key).map(|&i| &s.vendors[i])
        })
    }

    /// AVP by code under the given vendor, falling back to the same code
    /// under any vendor within the scope.
    pub fn avp_by_code(&self, app_id: u32, vendor_id: u32, code: u32) -> Option<&AvpDef> {
        self.in_scopes(app_id, |s| {
            s.avps_by_code
                .get(&(vendor_id, code))
                .map(|&i| &s.avps[i])
                .or_else(|| s.avps.iter().find(|a| a.code == code))
        })
    }

    /// AVP by name under the given vendor, falling back to the same name
    /// under any vendor within the scope.
    pub fn avp_by_name(&self, app_id: u32, vendor_id: u32, name: &str) -> Option<&AvpDef> {
        let key = name.to_ascii_lowercase();
        self.in_scopes(app_id, |s| {
            s.avps_by_name
                .get(&(vendor_id, key.clone()))
                .map(|&i| &s.avps[i])
                .or_else(|| s.avps.iter().find(|a| a.name.eq_ignore_ascii_case(name)))
        })
    }

    pub fn type_by_name(&self, app_id: u32, name: &str) -> Option<&TypeDef> {
        let key = name.to_ascii_lowercase();
        self.in_scopes(app_id, |s| s.types_by_name.get(&key).map(|&i| &s.types[i]))
    }

    /// Run a lookup against the application scope, then the base scope.
    fn in_scopes<'a, T>(&'a self, app_id: u32, lookup: impl Fn(&'a Scope) -> Option<T>) -> Option<T> {
        if let Some(found) = self.scopes.get(&app_id).and_then(&lookup) {
            return Some(found);
        }
        if app_id != 0 {
            return self.scopes.get(&0).and_then(&lookup);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        let mut d = Dictionary::new();
        d.add_application(Application { id: 0, name: "Base".to_string() });
        d.add_application(Application { id: 4, name: "Credit-Control".to_string() });
        d.add_command(0, CommandDef { code: 280, name: "Device-Watchdog".to_string() });
        d.add_command(4, CommandDef { code: 272, name: "Credit-Control".to_string() });
        d.add_avp(0, AvpDef::new(264, "Origin-Host", Some("DiameterIdentity")));
        d.add_avp(4, AvpDef::new(415, "CC-Request-Number", Some("Unsigned32")));
        d
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let d = dict();
        assert!(d.application_by_name("credit-control").is_some());
        assert!(d.command_by_name(0, "device-watchdog").is_some());
        assert!(d.avp_by_name(0, 0, "ORIGIN-HOST").is_some());
    }

    #[test]
    fn scoped_lookup_falls_back_to_base() {
        let d = dict();
        // base command visible from application 4
        assert!(d.command_by_code(4, 280).is_some());
        // application command not visible from base
        assert!(d.command_by_code(0, 272).is_none());
        assert!(d.avp_by_code(4, 0, 264).is_some());
    }

    #[test]
    fn vendor_scoped_avp_falls_back_to_code() {
        let mut d = dict();
        d.add_avp(0, AvpDef::new(2, "X-Custom", Some("Unsigned32")).with_vendor(9999));
        assert_eq!(d.avp_by_code(0, 9999, 2).map(|a| a.code), Some(2));
        // looked up without the vendor, the code still resolves
        assert_eq!(d.avp_by_code(0, 0, 2).map(|a| &*a.name), Some("X-Custom"));
    }
}
