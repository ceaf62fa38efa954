use crate::odata::schema::{EntitySchema, FieldDef};

const ID: FieldDef = FieldDef::read_only("id", "id");

pub static BOOKING_BUSINESS: EntitySchema = EntitySchema {
    name: "bookingBusiness",
    key: ID,
    fields: &[
        FieldDef::new("display_name", "displayName"),
        FieldDef::new("email", "email"),
        FieldDef::new("phone", "phone"),
        FieldDef::new("web_site_url", "webSiteUrl"),
        FieldDef::new("business_type", "businessType"),
        FieldDef::new("default_currency_iso", "defaultCurrencyIso"),
        FieldDef::read_only("is_published", "isPublished"),
        FieldDef::read_only("public_url", "publicUrl"),
    ],
};

pub static BOOKING_STAFF_MEMBER: EntitySchema = EntitySchema {
    name: "bookingStaffMember",
    key: ID,
    fields: &[
        FieldDef::new("display_name", "displayName"),
        FieldDef::new("email_address", "emailAddress"),
        FieldDef::new("role", "role"),
        FieldDef::new("use_business_hours", "useBusinessHours"),
    ],
};

pub static BOOKING_SERVICE: EntitySchema = EntitySchema {
    name: "bookingService",
    key: ID,
    fields: &[
        FieldDef::new("display_name", "displayName"),
        FieldDef::new("default_duration", "defaultDuration"),
        FieldDef::new("description", "description"),
    ],
};

pub static BOOKING_APPOINTMENT: EntitySchema = EntitySchema {
    name: "bookingAppointment",
    key: ID,
    fields: &[
        FieldDef::new("customer_name", "customerName"),
        FieldDef::new("customer_email_address", "customerEmailAddress"),
        FieldDef::new("service_id", "serviceId"),
        FieldDef::new("staff_member_ids", "staffMemberIds"),
        FieldDef::new("reminders", "reminders"),
        FieldDef::new("start_date_time", "startDateTime"),
        FieldDef::new("end_date_time", "endDateTime"),
        FieldDef::read_only("service_name", "serviceName"),
    ],
};
