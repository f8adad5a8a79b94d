use serde::{Deserialize, Serialize};

/// Postal subset of a user's address that the form edits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
}

/// A user as stored in (and returned by) the remote collection.
///
/// Fields the collection returns but the form never touches (username,
/// website, company, geo) are dropped on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Address,
}

/// Body sent with create and update requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}

/// Response body of a create or update. The collection normally echoes the
/// payload with an id, but the id is not trusted on create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedUser {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub payload: UserPayload,
}

impl SavedUser {
    pub fn into_record(self, id: u64) -> UserRecord {
        let UserPayload {
            name,
            email,
            phone,
            address,
        } = self.payload;
        UserRecord {
            id,
            name,
            email,
            phone,
            address,
        }
    }
}

/// Form field identifiers, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Street,
    City,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Street,
        Field::City,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Street => "Street",
            Field::City => "City",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Street => "street",
            Field::City => "city",
        }
    }
}

/// Unsaved form state.
///
/// `editing` holds the id of the record being edited; `None` means the form
/// creates a new record on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub editing: Option<u64>,
}

impl DraftForm {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            street: record.address.street.clone(),
            city: record.address.city.clone(),
            editing: Some(record.id),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Street => &self.street,
            Field::City => &self.city,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Street => &mut self.street,
            Field::City => &mut self.city,
        }
    }

    pub fn to_payload(&self) -> UserPayload {
        UserPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: Address {
                street: self.street.clone(),
                city: self.city.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_placeholder_user_and_ignores_extra_fields() {
        let raw = r#"{
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": { "name": "Romaguera-Crona" }
        }"#;

        let user: UserRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Leanne Graham");
        assert_eq!(user.address.street, "Kulas Light");
        assert_eq!(user.address.city, "Gwenborough");
        assert_eq!(user.phone, "1-770-736-8031 x56442");
    }

    #[test]
    fn missing_address_decodes_empty() {
        let user: UserRecord =
            serde_json::from_str(r#"{"id": 4, "name": "Ann", "email": "a@x.com"}"#).unwrap();
        assert_eq!(user.address, Address::default());
        assert_eq!(user.phone, "");
    }

    #[test]
    fn saved_user_reads_echoed_payload() {
        let raw = r#"{"name":"Ann","email":"a@x.com","phone":"1234567890",
                      "address":{"street":"","city":""},"id":11}"#;
        let saved: SavedUser = serde_json::from_str(raw).unwrap();
        assert_eq!(saved.id, Some(11));
        let record = saved.into_record(4);
        assert_eq!(record.id, 4);
        assert_eq!(record.name, "Ann");
    }

    #[test]
    fn draft_copies_record_and_nests_address_in_payload() {
        let record = UserRecord {
            id: 3,
            name: "Clementine Bauch".to_string(),
            email: "Nathan@yesenia.net".to_string(),
            phone: "1463123447".to_string(),
            address: Address {
                street: "Douglas Extension".to_string(),
                city: "McKenziehaven".to_string(),
            },
        };

        let draft = DraftForm::from_record(&record);
        assert_eq!(draft.editing, Some(3));
        assert_eq!(draft.get(Field::City), "McKenziehaven");

        let payload = draft.to_payload();
        assert_eq!(payload.address.street, "Douglas Extension");
        assert_eq!(payload.phone, "1463123447");
    }
}
