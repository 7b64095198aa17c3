//! Menu repository over the `sys_menu` table.

use diesel::prelude::*;

use crate::diesel_runtime::{Database, DbConnection};
use crate::error::{GeneratorError, Result};
use crate::menu::{MenuDraft, MenuKind, MenuNode, MenuRepository, PermissionKey};

diesel::table! {
    sys_menu (id) {
        id -> Integer,
        menu_name -> Varchar,
        parent_id -> Nullable<Integer>,
        order_num -> Integer,
        path -> Nullable<Varchar>,
        component -> Nullable<Varchar>,
        perms -> Nullable<Varchar>,
        icon -> Nullable<Varchar>,
        menu_type -> Varchar,
        visible -> Bool,
        status -> Bool,
    }
}

#[cfg(all(feature = "mysql", not(feature = "postgres")))]
diesel::define_sql_function! {
    /// Id generated by the last insert on the calling connection
    fn last_insert_id() -> diesel::sql_types::Unsigned<diesel::sql_types::BigInt>;
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sys_menu)]
struct MenuRow {
    id: i32,
    menu_name: String,
    parent_id: Option<i32>,
    order_num: i32,
    path: Option<String>,
    component: Option<String>,
    perms: Option<String>,
    icon: Option<String>,
    menu_type: String,
    visible: bool,
    status: bool,
}

impl MenuRow {
    fn into_node(self) -> MenuNode {
        MenuNode {
            id: self.id,
            name: self.menu_name,
            parent_id: self.parent_id,
            // Unknown codes come from hand-edited rows; treat them as pages.
            kind: MenuKind::from_code(&self.menu_type).unwrap_or(MenuKind::Page),
            route_path: self.path,
            component_ref: self.component,
            permission_key: self.perms,
            icon: self.icon,
            visible: self.visible,
            enabled: self.status,
            order_index: self.order_num,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = sys_menu)]
#[diesel(treat_none_as_null = true)]
struct MenuChangeset<'a> {
    menu_name: &'a str,
    parent_id: Option<i32>,
    order_num: i32,
    path: Option<&'a str>,
    component: Option<&'a str>,
    perms: Option<&'a str>,
    icon: Option<&'a str>,
    menu_type: &'a str,
    visible: bool,
    status: bool,
}

impl<'a> From<&'a MenuDraft> for MenuChangeset<'a> {
    fn from(draft: &'a MenuDraft) -> Self {
        Self {
            menu_name: &draft.name,
            parent_id: draft.parent_id,
            order_num: draft.order_index,
            path: draft.route_path.as_deref(),
            component: draft.component_ref.as_deref(),
            perms: draft.permission_key.as_deref(),
            icon: draft.icon.as_deref(),
            menu_type: draft.kind.code(),
            visible: draft.visible,
            status: draft.enabled,
        }
    }
}

/// Menu repository backed by the admin database
#[derive(Clone)]
pub struct DieselMenuRepository {
    db: Database,
}

impl DieselMenuRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn find_by_id(conn: &mut DbConnection, menu_id: i32) -> Result<MenuNode> {
    sys_menu::table
        .find(menu_id)
        .select(MenuRow::as_select())
        .first(conn)
        .optional()?
        .map(MenuRow::into_node)
        .ok_or(GeneratorError::MenuNotFound { id: menu_id })
}

impl MenuRepository for DieselMenuRepository {
    fn find_by_natural_key(&mut self, name: &str, parent: Option<i32>) -> Result<Option<MenuNode>> {
        use self::sys_menu::dsl::*;

        let mut conn = self.db.get_connection()?;
        let by_name = || sys_menu.into_boxed().filter(menu_name.eq(name.to_string()));

        let row = match parent.filter(|p| *p != 0) {
            Some(p) => by_name()
                .filter(parent_id.eq(p))
                .select(MenuRow::as_select())
                .order(id.asc())
                .first(&mut conn)
                .optional()?,
            None => {
                // Root nodes may be stored with a NULL or a 0 parent
                let null_parent = by_name()
                    .filter(parent_id.is_null())
                    .select(MenuRow::as_select())
                    .order(id.asc())
                    .first(&mut conn)
                    .optional()?;
                match null_parent {
                    Some(row) => Some(row),
                    None => by_name()
                        .filter(parent_id.eq(0))
                        .select(MenuRow::as_select())
                        .order(id.asc())
                        .first(&mut conn)
                        .optional()?,
                }
            }
        };
        Ok(row.map(MenuRow::into_node))
    }

    fn find_by_permission_key(&mut self, key: &PermissionKey) -> Result<Option<MenuNode>> {
        use self::sys_menu::dsl::*;

        let mut conn = self.db.get_connection()?;
        let row = sys_menu
            .filter(perms.eq(key.to_string()))
            .select(MenuRow::as_select())
            .order(id.asc())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(MenuRow::into_node))
    }

    fn find_children(&mut self, parent: i32) -> Result<Vec<MenuNode>> {
        use self::sys_menu::dsl::*;

        let mut conn = self.db.get_connection()?;
        let rows = sys_menu
            .filter(parent_id.eq(parent))
            .select(MenuRow::as_select())
            .order((order_num.asc(), id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(MenuRow::into_node).collect())
    }

    fn list(&mut self) -> Result<Vec<MenuNode>> {
        use self::sys_menu::dsl::*;

        let mut conn = self.db.get_connection()?;
        let rows = sys_menu
            .select(MenuRow::as_select())
            .order((order_num.asc(), id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(MenuRow::into_node).collect())
    }

    #[cfg(feature = "postgres")]
    fn create(&mut self, draft: &MenuDraft) -> Result<MenuNode> {
        let mut conn = self.db.get_connection()?;
        let row = diesel::insert_into(sys_menu::table)
            .values(MenuChangeset::from(draft))
            .returning(MenuRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into_node())
    }

    #[cfg(all(feature = "mysql", not(feature = "postgres")))]
    fn create(&mut self, draft: &MenuDraft) -> Result<MenuNode> {
        let mut conn = self.db.get_connection()?;
        diesel::insert_into(sys_menu::table)
            .values(MenuChangeset::from(draft))
            .execute(&mut conn)?;

        // LAST_INSERT_ID() is per connection
        let new_id: u64 = diesel::select(last_insert_id()).get_result(&mut conn)?;
        let new_id = i32::try_from(new_id)
            .map_err(|e| diesel::result::Error::DeserializationError(Box::new(e)))?;
        find_by_id(&mut conn, new_id)
    }

    fn update(&mut self, menu_id: i32, draft: &MenuDraft) -> Result<MenuNode> {
        let mut conn = self.db.get_connection()?;
        let affected = diesel::update(sys_menu::table.find(menu_id))
            .set(MenuChangeset::from(draft))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(GeneratorError::MenuNotFound { id: menu_id });
        }
        find_by_id(&mut conn, menu_id)
    }

    fn delete(&mut self, menu_id: i32) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let affected = diesel::delete(sys_menu::table.find(menu_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(GeneratorError::MenuNotFound { id: menu_id });
        }
        Ok(())
    }
}
