use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    ApplicationDetails, ApplicationStatus, Booking, BookingStatus, BookingView, PaymentStatus,
    Review, ReviewView, Service, Therapist, TherapistAdminView, TherapistApplication,
    TherapistPublic, TherapistSearch, TherapistStatus, User, UserRole, DATETIME_FORMAT,
};

// ── Helpers ──

fn ts(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn now_ts() -> String {
    ts(&Utc::now().naive_utc())
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

fn parse_opt_ts(s: Option<String>) -> anyhow::Result<Option<NaiveDateTime>> {
    s.as_deref().map(parse_ts).transpose()
}

fn list_json(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn parse_list(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Substring pattern for `LIKE ? ESCAPE '\'`; wildcards in the term match literally.
fn like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.trim().to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{escaped}%")
}

fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<anyhow::Result<T>>>,
) -> anyhow::Result<Vec<T>> {
    let mut out = vec![];
    for row in rows {
        out.push(row??);
    }
    Ok(out)
}

/// Accumulates optional `WHERE` clauses and their positional values in order.
#[derive(Default)]
struct QueryFilter {
    clauses: Vec<String>,
    values: Vec<Box<dyn ToSql>>,
}

impl QueryFilter {
    fn require(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    fn push(&mut self, clause: &str, value: impl ToSql + 'static) {
        self.clauses.push(clause.to_string());
        self.values.push(Box::new(value));
    }

    fn bind(&mut self, value: impl ToSql + 'static) {
        self.values.push(Box::new(value));
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        self.values.iter().map(|v| v.as_ref()).collect()
    }
}

// ── Users ──

const USER_COLUMNS: &str = "id, email, full_name, phone, role, password_hash, is_active, profile_image, \
     address, city, state, zip_code, emergency_contact, emergency_phone, preferences, created_at, updated_at";

fn parse_user_row(row: &Row) -> anyhow::Result<User> {
    let role_str: String = row.get(4)?;
    let preferences: String = row.get(14)?;
    let created_at: String = row.get(15)?;
    let updated_at: String = row.get(16)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        role: UserRole::parse(&role_str)
            .with_context(|| format!("unknown user role: {role_str}"))?,
        password_hash: row.get(5)?,
        is_active: row.get(6)?,
        profile_image: row.get(7)?,
        address: row.get(8)?,
        city: row.get(9)?,
        state: row.get(10)?,
        zip_code: row.get(11)?,
        emergency_contact: row.get(12)?,
        emergency_phone: row.get(13)?,
        preferences: serde_json::from_str(&preferences).unwrap_or(serde_json::json!({})),
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

pub fn insert_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO users ({USER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ),
        params![
            user.id,
            user.email,
            user.full_name,
            user.phone,
            user.role.as_str(),
            user.password_hash,
            user.is_active,
            user.profile_image,
            user.address,
            user.city,
            user.state,
            user.zip_code,
            user.emergency_contact,
            user.emergency_phone,
            user.preferences.to_string(),
            ts(&user.created_at),
            ts(&user.updated_at),
        ],
    )
    .context("failed to insert user")?;
    Ok(())
}

/// Persists profile fields only; role and credentials are written on insert.
pub fn save_user_profile(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE users SET full_name = ?1, phone = ?2, profile_image = ?3, address = ?4, city = ?5,
           state = ?6, zip_code = ?7, emergency_contact = ?8, emergency_phone = ?9,
           preferences = ?10, updated_at = ?11
         WHERE id = ?12",
        params![
            user.full_name,
            user.phone,
            user.profile_image,
            user.address,
            user.city,
            user.state,
            user.zip_code,
            user.emergency_contact,
            user.emergency_phone,
            user.preferences.to_string(),
            ts(&user.updated_at),
            user.id,
        ],
    )
    .context("failed to update user")?;
    Ok(())
}

fn get_user_where(conn: &Connection, column: &str, value: &str) -> anyhow::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
        params![value],
        |row| Ok(parse_user_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    get_user_where(conn, "id", id)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    get_user_where(conn, "email", &email.trim().to_lowercase())
}

pub fn get_user_by_phone(conn: &Connection, phone: &str) -> anyhow::Result<Option<User>> {
    get_user_where(conn, "phone", phone.trim())
}

pub fn set_user_active(conn: &Connection, id: &str, active: bool) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
        params![active, now_ts(), id],
    )?;
    Ok(count > 0)
}

pub fn list_users(
    conn: &Connection,
    role: Option<UserRole>,
    is_active: Option<bool>,
    limit: i64,
    skip: i64,
) -> anyhow::Result<Vec<User>> {
    let mut filter = QueryFilter::default();
    if let Some(role) = role {
        filter.push("role = ?", role.as_str());
    }
    if let Some(active) = is_active {
        filter.push("is_active = ?", active);
    }
    filter.bind(limit);
    filter.bind(skip);

    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(filter.params().as_slice(), |row| Ok(parse_user_row(row)))?;
    collect(rows)
}

// ── Therapists ──

const THERAPIST_COLUMNS: &str = "t.id, t.user_id, t.specialties, t.certifications, t.languages, \
     t.service_areas, t.experience_years, t.bio, t.hourly_rate, t.status, t.rating, t.reviews_count, \
     t.total_bookings, t.profile_image, t.gallery_images, t.is_available, t.admin_notes, \
     t.created_at, t.updated_at";

const THERAPIST_COLUMN_COUNT: usize = 19;

fn parse_therapist_row(row: &Row) -> anyhow::Result<Therapist> {
    let specialties: String = row.get(2)?;
    let certifications: String = row.get(3)?;
    let languages: String = row.get(4)?;
    let service_areas: String = row.get(5)?;
    let status_str: String = row.get(9)?;
    let gallery: String = row.get(14)?;
    let created_at: String = row.get(17)?;
    let updated_at: String = row.get(18)?;

    Ok(Therapist {
        id: row.get(0)?,
        user_id: row.get(1)?,
        specialties: parse_list(&specialties),
        certifications: parse_list(&certifications),
        languages: parse_list(&languages),
        service_areas: parse_list(&service_areas),
        experience_years: row.get(6)?,
        bio: row.get(7)?,
        hourly_rate: row.get(8)?,
        status: TherapistStatus::parse(&status_str)
            .with_context(|| format!("unknown therapist status: {status_str}"))?,
        rating: row.get(10)?,
        reviews_count: row.get(11)?,
        total_bookings: row.get(12)?,
        profile_image: row.get(13)?,
        gallery_images: parse_list(&gallery),
        is_available: row.get(15)?,
        admin_notes: row.get(16)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn parse_therapist_public_row(row: &Row) -> anyhow::Result<TherapistPublic> {
    let therapist = parse_therapist_row(row)?;
    let full_name: String = row.get(THERAPIST_COLUMN_COUNT)?;
    Ok(TherapistPublic::from_profile(therapist, full_name))
}

fn parse_therapist_admin_row(row: &Row) -> anyhow::Result<TherapistAdminView> {
    Ok(TherapistAdminView {
        therapist: parse_therapist_row(row)?,
        full_name: row.get(THERAPIST_COLUMN_COUNT)?,
        email: row.get(THERAPIST_COLUMN_COUNT + 1)?,
        phone: row.get(THERAPIST_COLUMN_COUNT + 2)?,
    })
}

pub fn insert_therapist(conn: &Connection, t: &Therapist) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO therapists (id, user_id, specialties, certifications, languages, service_areas,
           experience_years, bio, hourly_rate, status, rating, reviews_count, total_bookings,
           profile_image, gallery_images, is_available, admin_notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            t.id,
            t.user_id,
            list_json(&t.specialties),
            list_json(&t.certifications),
            list_json(&t.languages),
            list_json(&t.service_areas),
            t.experience_years,
            t.bio,
            t.hourly_rate,
            t.status.as_str(),
            t.rating,
            t.reviews_count,
            t.total_bookings,
            t.profile_image,
            list_json(&t.gallery_images),
            t.is_available,
            t.admin_notes,
            ts(&t.created_at),
            ts(&t.updated_at),
        ],
    )
    .context("failed to insert therapist")?;
    Ok(())
}

pub fn get_therapist(conn: &Connection, id: &str) -> anyhow::Result<Option<Therapist>> {
    conn.query_row(
        &format!("SELECT {THERAPIST_COLUMNS} FROM therapists t WHERE t.id = ?1"),
        params![id],
        |row| Ok(parse_therapist_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn get_therapist_by_user(conn: &Connection, user_id: &str) -> anyhow::Result<Option<Therapist>> {
    conn.query_row(
        &format!("SELECT {THERAPIST_COLUMNS} FROM therapists t WHERE t.user_id = ?1"),
        params![user_id],
        |row| Ok(parse_therapist_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn get_therapist_public(conn: &Connection, id: &str) -> anyhow::Result<Option<TherapistPublic>> {
    conn.query_row(
        &format!(
            "SELECT {THERAPIST_COLUMNS}, u.full_name
             FROM therapists t JOIN users u ON u.id = t.user_id
             WHERE t.id = ?1"
        ),
        params![id],
        |row| Ok(parse_therapist_public_row(row)),
    )
    .optional()?
    .transpose()
}

/// Approved, available therapists, best rated first.
pub fn search_therapists(
    conn: &Connection,
    search: &TherapistSearch,
    limit: i64,
    skip: i64,
) -> anyhow::Result<Vec<TherapistPublic>> {
    let mut filter = QueryFilter::default();
    filter.require("t.status = 'approved'");
    filter.require("t.is_available = 1");
    if let Some(city) = search.city.as_deref().filter(|c| !c.trim().is_empty()) {
        filter.push("LOWER(t.service_areas) LIKE ? ESCAPE '\\'", like(city));
    }
    if let Some(specialty) = search.specialty.as_deref().filter(|s| !s.trim().is_empty()) {
        filter.push("LOWER(t.specialties) LIKE ? ESCAPE '\\'", like(specialty));
    }
    if let Some(min_rating) = search.min_rating {
        filter.push("t.rating >= ?", min_rating);
    }
    if let Some(max_price) = search.max_price {
        filter.push("t.hourly_rate <= ?", max_price);
    }
    filter.bind(limit);
    filter.bind(skip);

    let sql = format!(
        "SELECT {THERAPIST_COLUMNS}, u.full_name
         FROM therapists t JOIN users u ON u.id = t.user_id{}
         ORDER BY t.rating DESC, t.created_at ASC LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(filter.params().as_slice(), |row| {
        Ok(parse_therapist_public_row(row))
    })?;
    collect(rows)
}

pub fn list_therapists_admin(
    conn: &Connection,
    status: Option<TherapistStatus>,
    limit: i64,
    skip: i64,
) -> anyhow::Result<Vec<TherapistAdminView>> {
    let mut filter = QueryFilter::default();
    if let Some(status) = status {
        filter.push("t.status = ?", status.as_str());
    }
    filter.bind(limit);
    filter.bind(skip);

    let sql = format!(
        "SELECT {THERAPIST_COLUMNS}, u.full_name, u.email, u.phone
         FROM therapists t JOIN users u ON u.id = t.user_id{}
         ORDER BY t.created_at DESC LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(filter.params().as_slice(), |row| {
        Ok(parse_therapist_admin_row(row))
    })?;
    collect(rows)
}

pub fn update_therapist_status(
    conn: &Connection,
    id: &str,
    status: TherapistStatus,
    notes: Option<&str>,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE therapists SET status = ?1, admin_notes = COALESCE(?2, admin_notes), updated_at = ?3
         WHERE id = ?4",
        params![status.as_str(), notes, now_ts(), id],
    )?;
    Ok(count > 0)
}

pub fn increment_therapist_bookings(conn: &Connection, id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE therapists SET total_bookings = total_bookings + 1, updated_at = ?1 WHERE id = ?2",
        params![now_ts(), id],
    )?;
    Ok(())
}

pub fn update_therapist_rating(
    conn: &Connection,
    id: &str,
    rating: f64,
    reviews_count: i64,
) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE therapists SET rating = ?1, reviews_count = ?2, updated_at = ?3 WHERE id = ?4",
        params![rating, reviews_count, now_ts(), id],
    )?;
    Ok(())
}

// ── Therapist Applications ──

const APPLICATION_COLUMNS: &str = "id, full_name, email, phone, address, city, state, zip_code, \
     experience_years, certifications, specialties, license_number, insurance_provider, service_areas, \
     availability, transportation, equipment_owned, languages, references_text, portfolio_url, \
     background_check, motivation, expectations, status, admin_notes, reviewed_by, reviewed_at, created_at";

fn parse_application_row(row: &Row) -> anyhow::Result<TherapistApplication> {
    let status_str: String = row.get(23)?;
    let reviewed_at: Option<String> = row.get(26)?;
    let created_at: String = row.get(27)?;

    Ok(TherapistApplication {
        id: row.get(0)?,
        details: ApplicationDetails {
            full_name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            address: row.get(4)?,
            city: row.get(5)?,
            state: row.get(6)?,
            zip_code: row.get(7)?,
            experience_years: row.get(8)?,
            certifications: row.get(9)?,
            specialties: row.get(10)?,
            license_number: row.get(11)?,
            insurance_provider: row.get(12)?,
            service_areas: row.get(13)?,
            availability: row.get(14)?,
            transportation: row.get(15)?,
            equipment_owned: row.get(16)?,
            languages: row.get(17)?,
            references: row.get(18)?,
            portfolio_url: row.get(19)?,
            background_check: row.get(20)?,
            motivation: row.get(21)?,
            expectations: row.get(22)?,
        },
        status: ApplicationStatus::parse(&status_str)
            .with_context(|| format!("unknown application status: {status_str}"))?,
        admin_notes: row.get(24)?,
        reviewed_by: row.get(25)?,
        reviewed_at: parse_opt_ts(reviewed_at)?,
        created_at: parse_ts(&created_at)?,
    })
}

pub fn insert_application(conn: &Connection, app: &TherapistApplication) -> anyhow::Result<()> {
    let d = &app.details;
    conn.execute(
        &format!(
            "INSERT INTO therapist_applications ({APPLICATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                     ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)"
        ),
        params![
            app.id,
            d.full_name,
            d.email,
            d.phone,
            d.address,
            d.city,
            d.state,
            d.zip_code,
            d.experience_years,
            d.certifications,
            d.specialties,
            d.license_number,
            d.insurance_provider,
            d.service_areas,
            d.availability,
            d.transportation,
            d.equipment_owned,
            d.languages,
            d.references,
            d.portfolio_url,
            d.background_check,
            d.motivation,
            d.expectations,
            app.status.as_str(),
            app.admin_notes,
            app.reviewed_by,
            app.reviewed_at.as_ref().map(ts),
            ts(&app.created_at),
        ],
    )
    .context("failed to insert therapist application")?;
    Ok(())
}

pub fn get_application(conn: &Connection, id: &str) -> anyhow::Result<Option<TherapistApplication>> {
    conn.query_row(
        &format!("SELECT {APPLICATION_COLUMNS} FROM therapist_applications WHERE id = ?1"),
        params![id],
        |row| Ok(parse_application_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn application_exists_for_email(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM therapist_applications WHERE email = ?1",
        params![email.trim().to_lowercase()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_applications(
    conn: &Connection,
    status: Option<ApplicationStatus>,
    limit: i64,
    skip: i64,
) -> anyhow::Result<Vec<TherapistApplication>> {
    let mut filter = QueryFilter::default();
    if let Some(status) = status {
        filter.push("status = ?", status.as_str());
    }
    filter.bind(limit);
    filter.bind(skip);

    let sql = format!(
        "SELECT {APPLICATION_COLUMNS} FROM therapist_applications{}
         ORDER BY created_at DESC LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(filter.params().as_slice(), |row| {
        Ok(parse_application_row(row))
    })?;
    collect(rows)
}

pub fn review_application(
    conn: &Connection,
    id: &str,
    status: ApplicationStatus,
    reviewer_id: &str,
    notes: &str,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE therapist_applications
         SET status = ?1, reviewed_by = ?2, reviewed_at = ?3, admin_notes = ?4
         WHERE id = ?5",
        params![status.as_str(), reviewer_id, now_ts(), notes, id],
    )?;
    Ok(count > 0)
}

// ── Services ──

const SERVICE_COLUMNS: &str = "id, name, description, duration_minutes, base_price, category, is_active, \
     image_url, created_at, updated_at";

fn parse_service_row(row: &Row) -> anyhow::Result<Service> {
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        duration_minutes: row.get(3)?,
        base_price: row.get(4)?,
        category: row.get(5)?,
        is_active: row.get(6)?,
        image_url: row.get(7)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

pub fn insert_service(conn: &Connection, s: &Service) -> anyhow::Result<()> {
    conn.execute(
        &format!("INSERT INTO services ({SERVICE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
        params![
            s.id,
            s.name,
            s.description,
            s.duration_minutes,
            s.base_price,
            s.category,
            s.is_active,
            s.image_url,
            ts(&s.created_at),
            ts(&s.updated_at),
        ],
    )
    .context("failed to insert service")?;
    Ok(())
}

pub fn save_service(conn: &Connection, s: &Service) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE services SET name = ?1, description = ?2, duration_minutes = ?3, base_price = ?4,
           category = ?5, is_active = ?6, image_url = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            s.name,
            s.description,
            s.duration_minutes,
            s.base_price,
            s.category,
            s.is_active,
            s.image_url,
            ts(&s.updated_at),
            s.id,
        ],
    )
    .context("failed to update service")?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    conn.query_row(
        &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
        params![id],
        |row| Ok(parse_service_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn list_services(
    conn: &Connection,
    category: Option<&str>,
    is_active: bool,
    limit: i64,
    skip: i64,
) -> anyhow::Result<Vec<Service>> {
    let mut filter = QueryFilter::default();
    filter.push("is_active = ?", is_active);
    if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
        filter.push("LOWER(category) LIKE ? ESCAPE '\\'", like(category));
    }
    filter.bind(limit);
    filter.bind(skip);

    let sql = format!(
        "SELECT {SERVICE_COLUMNS} FROM services{} ORDER BY name ASC LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(filter.params().as_slice(), |row| Ok(parse_service_row(row)))?;
    collect(rows)
}

/// Inserts the standard catalog entries that are missing; returns how many were added.
pub fn seed_default_services(conn: &Connection) -> anyhow::Result<usize> {
    const DEFAULTS: &[(&str, &str, &str, i32, f64, &str, &str)] = &[
        (
            "swedish-massage",
            "Swedish Massage",
            "Classic relaxation massage with gentle, flowing strokes to ease tension and promote relaxation.",
            60,
            120.0,
            "Relaxation",
            "https://images.pexels.com/photos/7544430/pexels-photo-7544430.jpeg",
        ),
        (
            "deep-tissue-massage",
            "Deep Tissue Massage",
            "Therapeutic massage targeting deep muscle layers to relieve chronic tension and pain.",
            60,
            150.0,
            "Therapeutic",
            "https://images.pexels.com/photos/6075005/pexels-photo-6075005.jpeg",
        ),
        (
            "hot-stone-massage",
            "Hot Stone Massage",
            "Heated stones combined with massage techniques for ultimate relaxation and muscle relief.",
            90,
            180.0,
            "Luxury",
            "https://images.pexels.com/photos/360209/pexels-photo-360209.jpeg",
        ),
        (
            "aromatherapy-massage",
            "Aromatherapy Massage",
            "Essential oils enhance your massage experience for mind-body wellness.",
            60,
            160.0,
            "Wellness",
            "https://images.pexels.com/photos/139396/lavender-flowers-blue-flowers-purple-139396.jpeg",
        ),
        (
            "couples-massage",
            "Couples Massage",
            "Side-by-side massage experience for two people in a romantic setting.",
            60,
            300.0,
            "Special",
            "https://images.unsplash.com/photo-1703980467952-760bcd0e464a",
        ),
    ];

    let now = now_ts();
    let mut inserted = 0;
    for (id, name, description, duration, price, category, image) in DEFAULTS {
        inserted += conn.execute(
            &format!(
                "INSERT OR IGNORE INTO services ({SERVICE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8, ?8)"
            ),
            params![id, name, description, duration, price, category, image, now],
        )?;
    }
    Ok(inserted)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "b.id, b.client_id, b.therapist_id, b.service_id, b.appointment_date, \
     b.appointment_time, b.duration_minutes, b.location_address, b.location_city, b.location_state, \
     b.location_zip, b.special_requests, b.status, b.total_amount, b.payment_status, b.payment_intent_id, \
     b.cancellation_reason, b.completed_at, b.therapist_notes, b.created_at, b.updated_at";

const BOOKING_COLUMN_COUNT: usize = 21;

const BOOKING_VIEW_SELECT: &str = "tu.full_name, s.name, c.full_name, c.email
     FROM bookings b
     LEFT JOIN therapists t ON t.id = b.therapist_id
     LEFT JOIN users tu ON tu.id = t.user_id
     LEFT JOIN services s ON s.id = b.service_id
     LEFT JOIN users c ON c.id = b.client_id";

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(4)?;
    let time_str: String = row.get(5)?;
    let status_str: String = row.get(12)?;
    let payment_str: String = row.get(14)?;
    let completed_at: Option<String> = row.get(17)?;
    let created_at: String = row.get(19)?;
    let updated_at: String = row.get(20)?;

    Ok(Booking {
        id: row.get(0)?,
        client_id: row.get(1)?,
        therapist_id: row.get(2)?,
        service_id: row.get(3)?,
        appointment_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .with_context(|| format!("invalid stored date: {date_str}"))?,
        appointment_time: NaiveTime::parse_from_str(&time_str, "%H:%M")
            .with_context(|| format!("invalid stored time: {time_str}"))?,
        duration_minutes: row.get(6)?,
        location_address: row.get(7)?,
        location_city: row.get(8)?,
        location_state: row.get(9)?,
        location_zip: row.get(10)?,
        special_requests: row.get(11)?,
        status: BookingStatus::parse(&status_str)
            .with_context(|| format!("unknown booking status: {status_str}"))?,
        total_amount: row.get(13)?,
        payment_status: PaymentStatus::parse(&payment_str)
            .with_context(|| format!("unknown payment status: {payment_str}"))?,
        payment_intent_id: row.get(15)?,
        cancellation_reason: row.get(16)?,
        completed_at: parse_opt_ts(completed_at)?,
        therapist_notes: row.get(18)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn parse_booking_view_row(row: &Row) -> anyhow::Result<BookingView> {
    Ok(BookingView {
        booking: parse_booking_row(row)?,
        therapist_name: row.get(BOOKING_COLUMN_COUNT)?,
        service_name: row.get(BOOKING_COLUMN_COUNT + 1)?,
        client_name: row.get(BOOKING_COLUMN_COUNT + 2)?,
        client_email: row.get(BOOKING_COLUMN_COUNT + 3)?,
    })
}

fn date_str(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn time_str(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn insert_booking(conn: &Connection, b: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, client_id, therapist_id, service_id, appointment_date,
           appointment_time, duration_minutes, location_address, location_city, location_state,
           location_zip, special_requests, status, total_amount, payment_status, payment_intent_id,
           cancellation_reason, completed_at, therapist_notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                 ?19, ?20, ?21)",
        params![
            b.id,
            b.client_id,
            b.therapist_id,
            b.service_id,
            date_str(&b.appointment_date),
            time_str(&b.appointment_time),
            b.duration_minutes,
            b.location_address,
            b.location_city,
            b.location_state,
            b.location_zip,
            b.special_requests,
            b.status.as_str(),
            b.total_amount,
            b.payment_status.as_str(),
            b.payment_intent_id,
            b.cancellation_reason,
            b.completed_at.as_ref().map(ts),
            b.therapist_notes,
            ts(&b.created_at),
            ts(&b.updated_at),
        ],
    )
    .context("failed to insert booking")?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn get_booking_view(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingView>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS}, {BOOKING_VIEW_SELECT} WHERE b.id = ?1"),
        params![id],
        |row| Ok(parse_booking_view_row(row)),
    )
    .optional()?
    .transpose()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingOrder {
    /// Latest appointment first; what clients and therapists see.
    #[default]
    AppointmentDesc,
    /// Most recently created first; the admin view.
    CreatedDesc,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub client_id: Option<String>,
    pub therapist_id: Option<String>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub order: BookingOrder,
    pub limit: i64,
    pub skip: i64,
}

pub fn list_bookings(conn: &Connection, f: &BookingFilter) -> anyhow::Result<Vec<BookingView>> {
    let mut filter = QueryFilter::default();
    if let Some(client_id) = &f.client_id {
        filter.push("b.client_id = ?", client_id.clone());
    }
    if let Some(therapist_id) = &f.therapist_id {
        filter.push("b.therapist_id = ?", therapist_id.clone());
    }
    if let Some(status) = f.status {
        filter.push("b.status = ?", status.as_str());
    }
    if let Some(payment_status) = f.payment_status {
        filter.push("b.payment_status = ?", payment_status.as_str());
    }
    if let Some(from) = &f.date_from {
        filter.push("b.appointment_date >= ?", date_str(from));
    }
    if let Some(to) = &f.date_to {
        filter.push("b.appointment_date <= ?", date_str(to));
    }
    filter.bind(f.limit);
    filter.bind(f.skip);

    let order = match f.order {
        BookingOrder::AppointmentDesc => "b.appointment_date DESC, b.appointment_time DESC",
        BookingOrder::CreatedDesc => "b.created_at DESC",
    };
    let sql = format!(
        "SELECT {BOOKING_COLUMNS}, {BOOKING_VIEW_SELECT}{} ORDER BY {order} LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(filter.params().as_slice(), |row| {
        Ok(parse_booking_view_row(row))
    })?;
    collect(rows)
}

/// Confirmed and in-progress bookings for one therapist on one date.
pub fn slot_holders_on(
    conn: &Connection,
    therapist_id: &str,
    date: &NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings b
         WHERE b.therapist_id = ?1 AND b.appointment_date = ?2
           AND b.status IN ('confirmed', 'in_progress')
         ORDER BY b.appointment_time ASC"
    ))?;
    let rows = stmt.query_map(params![therapist_id, date_str(date)], |row| {
        Ok(parse_booking_row(row))
    })?;
    collect(rows)
}

/// The booking holding the exact (date, time) start for a therapist, if any.
pub fn find_slot_holder(
    conn: &Connection,
    therapist_id: &str,
    date: &NaiveDate,
    time: &NaiveTime,
    exclude_id: Option<&str>,
) -> anyhow::Result<Option<Booking>> {
    conn.query_row(
        &format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b
             WHERE b.therapist_id = ?1 AND b.appointment_date = ?2 AND b.appointment_time = ?3
               AND b.status IN ('confirmed', 'in_progress') AND b.id != ?4
             LIMIT 1"
        ),
        params![therapist_id, date_str(date), time_str(time), exclude_id.unwrap_or("")],
        |row| Ok(parse_booking_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_ts(), id],
    )?;
    Ok(count > 0)
}

pub fn complete_booking(conn: &Connection, id: &str, notes: Option<&str>) -> anyhow::Result<bool> {
    let now = now_ts();
    let count = conn.execute(
        "UPDATE bookings SET status = 'completed', completed_at = ?1, updated_at = ?1,
           therapist_notes = COALESCE(?2, therapist_notes)
         WHERE id = ?3",
        params![now, notes, id],
    )?;
    Ok(count > 0)
}

pub fn cancel_booking(conn: &Connection, id: &str, reason: Option<&str>) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'cancelled', cancellation_reason = ?1, updated_at = ?2
         WHERE id = ?3 AND status IN ('pending', 'confirmed', 'in_progress')",
        params![reason, now_ts(), id],
    )?;
    Ok(count > 0)
}

pub fn set_payment_intent(conn: &Connection, id: &str, intent_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE bookings SET payment_intent_id = ?1, updated_at = ?2 WHERE id = ?3",
        params![intent_id, now_ts(), id],
    )?;
    Ok(())
}

pub fn update_payment_status(
    conn: &Connection,
    id: &str,
    payment_status: PaymentStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET payment_status = ?1, updated_at = ?2 WHERE id = ?3",
        params![payment_status.as_str(), now_ts(), id],
    )?;
    Ok(count > 0)
}

pub fn mark_refunded(conn: &Connection, id: &str, reason: Option<&str>) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET payment_status = 'refunded', status = 'cancelled',
           cancellation_reason = COALESCE(?1, cancellation_reason), updated_at = ?2
         WHERE id = ?3 AND status IN ('pending', 'confirmed', 'in_progress')",
        params![reason, now_ts(), id],
    )?;
    Ok(count > 0)
}

// ── Reviews ──

const REVIEW_COLUMNS: &str = "r.id, r.booking_id, r.client_id, r.therapist_id, r.rating, r.comment, \
     r.is_verified, r.helpful_count, r.created_at";

fn parse_review_row(row: &Row) -> anyhow::Result<Review> {
    let created_at: String = row.get(8)?;
    Ok(Review {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        client_id: row.get(2)?,
        therapist_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        is_verified: row.get(6)?,
        helpful_count: row.get(7)?,
        created_at: parse_ts(&created_at)?,
    })
}

fn parse_review_view_row(row: &Row) -> anyhow::Result<ReviewView> {
    Ok(ReviewView {
        review: parse_review_row(row)?,
        client_name: row.get(9)?,
    })
}

pub fn insert_review(conn: &Connection, r: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, booking_id, client_id, therapist_id, rating, comment, is_verified,
           helpful_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            r.id,
            r.booking_id,
            r.client_id,
            r.therapist_id,
            r.rating,
            r.comment,
            r.is_verified,
            r.helpful_count,
            ts(&r.created_at),
        ],
    )
    .context("failed to insert review")?;
    Ok(())
}

pub fn review_exists_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE booking_id = ?1",
        params![booking_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn ratings_for_therapist(conn: &Connection, therapist_id: &str) -> anyhow::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT rating FROM reviews WHERE therapist_id = ?1")?;
    let rows = stmt.query_map(params![therapist_id], |row| row.get::<_, i64>(0))?;
    let mut ratings = vec![];
    for row in rows {
        ratings.push(row?);
    }
    Ok(ratings)
}

pub fn list_reviews_for_therapist(
    conn: &Connection,
    therapist_id: &str,
    limit: i64,
    skip: i64,
) -> anyhow::Result<Vec<ReviewView>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REVIEW_COLUMNS}, c.full_name
         FROM reviews r JOIN users c ON c.id = r.client_id
         WHERE r.therapist_id = ?1
         ORDER BY r.created_at DESC LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(params![therapist_id, limit, skip], |row| {
        Ok(parse_review_view_row(row))
    })?;
    collect(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_escapes_wildcards() {
        assert_eq!(like(" Austin "), "%austin%");
        assert_eq!(like("_"), "%\\_%");
        assert_eq!(like("100%"), "%100\\%%");
        assert_eq!(like("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_like_pattern_matches_literally() {
        let conn = Connection::open_in_memory().unwrap();
        let hit = |value: &str, term: &str| -> bool {
            conn.query_row(
                "SELECT ?1 LIKE ?2 ESCAPE '\\'",
                params![value, like(term)],
                |row| row.get(0),
            )
            .unwrap()
        };
        assert!(hit("[\"austin\"]", "aus"));
        assert!(!hit("[\"austin\"]", "_"));
        assert!(!hit("[\"austin\"]", "%"));
        assert!(hit("[\"new_york\"]", "w_y"));
    }
}
