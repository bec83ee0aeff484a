use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use super::{Entry, EventName, Listener, ListenerId, RawListener};

/// Реестр: имя события → упорядоченный список записей.
///
/// Инварианты:
/// - ключ присутствует только при непустом списке (без "надгробий");
/// - записи в списке идут в порядке регистрации, он же порядок вызова;
/// - имя события живёт, пока у него есть записи: ключ карты и есть
///   единственная копия имени, которую держит эмиттер.
///
/// Реестр не синхронизирован сам по себе: эмиттер держит его под одним
/// мьютексом и никогда не держит этот мьютекс во время вызова обработчиков.
/// Удаляющие методы возвращают снятые записи, чтобы эмиттер освобождал их
/// уже после снятия мьютекса.
#[derive(Default)]
pub(crate) struct Registry {
    events: BTreeMap<EventName, Vec<Arc<Entry>>>,
    /// События, для которых уже было выдано предупреждение о лимите.
    warned: HashSet<EventName>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Добавляет запись в конец списка события.
    ///
    /// Возвращает имя события (общее с ключом реестра) и новое число
    /// записей для него.
    pub(crate) fn insert(
        &mut self,
        event: &str,
        entry: Entry,
    ) -> (EventName, usize) {
        let name = match self.events.get_key_value(event) {
            Some((name, _)) => name.clone(),
            None => EventName::from(event),
        };
        let list = self.events.entry(name.clone()).or_default();
        list.push(Arc::new(entry));
        (name, list.len())
    }

    /// Снимает все записи, чей исходный обработчик совпадает с `listener`.
    pub(crate) fn remove_matching(
        &mut self,
        event: &str,
        listener: &Listener,
    ) -> Vec<Arc<Entry>> {
        self.remove_where(event, |entry| entry.listener().ptr_eq(listener))
    }

    /// Снимает запись с конкретным идентификатором.
    pub(crate) fn remove_entry(
        &mut self,
        event: &str,
        id: ListenerId,
    ) -> Option<Arc<Entry>> {
        self.remove_where(event, |entry| entry.id() == id).pop()
    }

    fn remove_where(
        &mut self,
        event: &str,
        mut matches: impl FnMut(&Entry) -> bool,
    ) -> Vec<Arc<Entry>> {
        let Some(list) = self.events.get_mut(event) else {
            return Vec::new();
        };

        let (removed, kept): (Vec<_>, Vec<_>) =
            list.drain(..).partition(|entry| matches(&**entry));
        *list = kept;

        if list.is_empty() {
            self.drop_event(event);
        }
        removed
    }

    /// Снимает все записи события.
    pub(crate) fn clear_event(
        &mut self,
        event: &str,
    ) -> Vec<Arc<Entry>> {
        self.warned.remove(event);
        self.events.remove(event).unwrap_or_default()
    }

    /// Полностью очищает реестр.
    pub(crate) fn clear(&mut self) -> Vec<Arc<Entry>> {
        self.warned.clear();
        std::mem::take(&mut self.events)
            .into_values()
            .flatten()
            .collect()
    }

    fn drop_event(
        &mut self,
        event: &str,
    ) {
        self.events.remove(event);
        self.warned.remove(event);
    }

    /// Копия списка записей для dispatch вместе с именем события; `None`,
    /// если слушателей нет.
    ///
    /// Копируются только `Arc`, сами записи общие с реестром, поэтому флаг
    /// `fired` одноразовой записи виден и из копии, и из реестра.
    pub(crate) fn snapshot(
        &self,
        event: &str,
    ) -> Option<(EventName, Vec<Arc<Entry>>)> {
        self.events
            .get_key_value(event)
            .map(|(name, list)| (name.clone(), list.to_vec()))
    }

    pub(crate) fn count(
        &self,
        event: &str,
    ) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    pub(crate) fn contains(
        &self,
        event: &str,
    ) -> bool {
        self.events.contains_key(event)
    }

    pub(crate) fn names(&self) -> Vec<EventName> {
        self.events.keys().cloned().collect()
    }

    pub(crate) fn listeners(
        &self,
        event: &str,
    ) -> Vec<Listener> {
        self.events
            .get(event)
            .map(|list| list.iter().map(|e| e.listener().clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn raw_listeners(
        &self,
        event: &str,
    ) -> Vec<RawListener> {
        self.events
            .get(event)
            .map(|list| list.iter().cloned().map(RawListener::new).collect())
            .unwrap_or_default()
    }

    /// Отмечает, что предупреждение о лимите для события выдано.
    ///
    /// Возвращает `true` только при первой отметке (пока событие не
    /// покинет реестр).
    pub(crate) fn mark_warned(
        &mut self,
        event: &EventName,
    ) -> bool {
        self.warned.insert(event.clone())
    }

    /// Общее число записей во всех событиях.
    pub(crate) fn total(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}
