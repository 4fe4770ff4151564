use serde::Deserialize;

use super::repo_types::Profile;

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub dietary_preferences: Option<Vec<String>>,
    pub cuisine_preferences: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.display_name {
            let name = name.trim().to_string();
            profile.display_name = (!name.is_empty()).then_some(name);
        }
        if let Some(v) = self.dietary_preferences {
            profile.dietary_preferences = clean_list(v);
        }
        if let Some(v) = self.cuisine_preferences {
            profile.cuisine_preferences = clean_list(v);
        }
        if let Some(v) = self.allergies {
            profile.allergies = clean_list(v);
        }
    }
}

/// Trims entries, drops blanks and duplicates, keeps first-seen order.
pub(crate) fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim().to_string();
        if !v.is_empty() && !out.iter().any(|x| x.eq_ignore_ascii_case(&v)) {
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn patch_only_touches_present_fields() {
        let mut profile = Profile::new(Uuid::new_v4(), Some("cook".into()));
        profile.allergies = vec!["peanuts".into()];

        ProfilePatch {
            dietary_preferences: Some(vec![" vegan ".into(), "".into(), "Vegan".into(), "keto".into()]),
            ..Default::default()
        }
        .apply(&mut profile);

        assert_eq!(profile.display_name.as_deref(), Some("cook"));
        assert_eq!(profile.dietary_preferences, vec!["vegan", "keto"]);
        assert_eq!(profile.allergies, vec!["peanuts"]);
    }

    #[test]
    fn blank_display_name_clears_it() {
        let mut profile = Profile::new(Uuid::new_v4(), Some("cook".into()));
        ProfilePatch {
            display_name: Some("   ".into()),
            ..Default::default()
        }
        .apply(&mut profile);
        assert!(profile.display_name.is_none());
    }
}
