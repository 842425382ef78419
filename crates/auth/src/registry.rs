use parking_lot::RwLock;

/// Registered administrative groups.
#[derive(Debug, Clone, Default)]
struct AdminGroups {
    admins: Vec<String>,
    super_admins: Vec<String>,
}

/// Process-lifetime catalog of admin and super-admin group names.
///
/// Registration is append-only and duplicates are kept. Both lists sit
/// behind one lock, so a reader sees a registration call entirely or not at
/// all.
#[derive(Debug, Default)]
pub struct AdminRegistry {
    groups: RwLock<AdminGroups>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_admin_groups<I, S>(&self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: Vec<String> = groups.into_iter().map(Into::into).collect();
        tracing::debug!(?groups, "registering admin groups");
        self.groups.write().admins.extend(groups);
    }

    pub fn register_super_admin_groups<I, S>(&self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: Vec<String> = groups.into_iter().map(Into::into).collect();
        tracing::debug!(?groups, "registering super admin groups");
        self.groups.write().super_admins.extend(groups);
    }

    /// Admin and super-admin groups, admins first.
    pub fn all_admin_groups(&self) -> Vec<String> {
        let groups = self.groups.read();
        groups
            .admins
            .iter()
            .chain(groups.super_admins.iter())
            .cloned()
            .collect()
    }

    pub fn super_admin_groups(&self) -> Vec<String> {
        self.groups.read().super_admins.clone()
    }

    /// Whether `group` is an admin or a super-admin group.
    pub fn is_admin(&self, group: &str) -> bool {
        let groups = self.groups.read();
        groups
            .admins
            .iter()
            .chain(groups.super_admins.iter())
            .any(|g| g == group)
    }

    pub fn is_super_admin(&self, group: &str) -> bool {
        self.groups.read().super_admins.iter().any(|g| g == group)
    }
}
