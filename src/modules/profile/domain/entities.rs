use serde::{Deserialize, Serialize};

/// One user's profile aggregate, stored whole at `users/{uid}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    #[serde(rename = "profileImageURL")]
    pub profile_image_url: String,
    pub birthday: UserInfoItem,
    pub address: UserInfoItem,
    pub phone_number: UserInfoItem,
    pub email: UserInfoItem,
    pub other_items: Vec<UserInfoItem>,
    pub education_items: Vec<EducationItem>,
}

impl UserInfo {
    /// Initial snapshot shown before the stored profile arrives.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            profile_image_url: String::new(),
            birthday: UserInfoItem::new("Birthday", ""),
            address: UserInfoItem::new("Address", ""),
            phone_number: UserInfoItem::new("Phone", ""),
            email: UserInfoItem::new("Email", ""),
            other_items: Vec::new(),
            education_items: Vec::new(),
        }
    }

    /// The four fixed items followed by the user-extensible ones, in
    /// display order.
    pub fn all_items(&self) -> Vec<UserInfoItem> {
        let mut items = vec![
            self.birthday.clone(),
            self.address.clone(),
            self.phone_number.clone(),
            self.email.clone(),
        ];
        items.extend(self.other_items.iter().cloned());
        items
    }
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::empty()
    }
}

/// Labeled key/value pair, used for the fixed profile fields and for the
/// user-extensible "other" list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoItem {
    pub label: String,
    pub contents: String,
}

impl UserInfoItem {
    pub fn new(label: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            contents: contents.into(),
        }
    }
}

/// One education entry; same shape as a resume item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub period: String,
    pub title: String,
    pub second_title: String,
    pub description: String,
}

impl EducationItem {
    pub fn new(
        period: impl Into<String>,
        title: impl Into<String>,
        second_title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            period: period.into(),
            title: title.into(),
            second_title: second_title.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserInfo {
        UserInfo {
            name: "Jaewon".to_string(),
            profile_image_url: "profile_images/u1".to_string(),
            birthday: UserInfoItem::new("Birthday", "1996.03.14."),
            address: UserInfoItem::new("Address", "Seoul"),
            phone_number: UserInfoItem::new("Phone", "010-1234-5678"),
            email: UserInfoItem::new("Email", "a@b.com"),
            other_items: vec![UserInfoItem::new("GitHub", "jaewon")],
            education_items: vec![EducationItem::new(
                "2015.03 - 2019.02",
                "Some University",
                "Computer Science",
                "",
            )],
        }
    }

    #[test]
    fn wire_round_trip_preserves_every_field() {
        let user = sample_user();

        let encoded = serde_json::to_value(&user).unwrap();
        let decoded: UserInfo = serde_json::from_value(encoded).unwrap();

        assert_eq!(decoded, user);
    }

    #[test]
    fn profile_image_key_keeps_the_upper_case_url_suffix() {
        let encoded = serde_json::to_value(sample_user()).unwrap();
        assert!(encoded.get("profileImageURL").is_some());
        assert!(encoded.get("educationItems").is_some());
    }

    #[test]
    fn all_items_lists_fixed_fields_then_other_items() {
        let user = sample_user();

        let items = user.all_items();

        assert_eq!(items.len(), 5);
        assert_eq!(items[0], user.birthday);
        assert_eq!(items[3], user.email);
        assert_eq!(items[4], user.other_items[0]);
    }

    #[test]
    fn empty_profile_compares_equal_to_itself() {
        assert_eq!(UserInfo::empty(), UserInfo::empty());
    }
}
